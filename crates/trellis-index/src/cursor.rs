//! Cursors over indices.
//!
//! A cursor is an absolute position, not a borrow: it stays alive across
//! later mutations of the index it came from. The engine never blocks or
//! revalidates on its own: each cursor snapshots its type's modification
//! counter when created (and when explicitly re-synchronized), and the
//! caller is responsible for checking [`is_concurrent_modification`]
//! before trusting a cursor that may have gone stale.
//!
//! [`is_concurrent_modification`]: LeafCursor::is_concurrent_modification

use std::cmp::Ordering;
use std::sync::Arc;

use trellis_core::{Addr, ComparatorRef, IndexKind};

use crate::counters::ModCounters;
use crate::leaf::LeafRef;

/// Cursor over one leaf index.
#[derive(Clone)]
pub struct LeafCursor {
    index: LeafRef,
    counters: Arc<ModCounters>,
    snapshot: u64,
    pos: isize,
}

impl LeafCursor {
    pub(crate) fn new(index: LeafRef, counters: Arc<ModCounters>) -> Self {
        let snapshot = counters.get(index.type_code());
        Self {
            index,
            counters,
            snapshot,
            pos: 0,
        }
    }

    /// Whether the cursor is positioned on an entry.
    pub fn is_valid(&self) -> bool {
        self.pos >= 0 && (self.pos as usize) < self.index.size()
    }

    /// The entry under the cursor, or `None` when not positioned on one.
    pub fn get(&self) -> Option<Addr> {
        if self.pos < 0 {
            return None;
        }
        self.index.get(self.pos as usize)
    }

    pub fn move_to_first(&mut self) {
        self.pos = 0;
    }

    pub fn move_to_last(&mut self) {
        self.pos = self.index.size() as isize - 1;
    }

    pub fn move_to_next(&mut self) {
        self.pos += 1;
    }

    pub fn move_to_previous(&mut self) {
        self.pos -= 1;
    }

    /// Position on some entry matching `fs` (by key for ordered leaves,
    /// by identity for bags), or on the insertion point when absent,
    /// which leaves the cursor at the first entry ordering after `fs`,
    /// or past the end.
    pub fn move_to(&mut self, fs: Addr) {
        self.pos = match self.index.position_for(fs) {
            Ok(pos) | Err(pos) => pos as isize,
        };
    }

    /// Duplicate this cursor; the copy has its own position and its own
    /// staleness snapshot.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Whether any index of this cursor's type has been structurally
    /// mutated since the snapshot was taken.
    pub fn is_concurrent_modification(&self) -> bool {
        self.snapshot != self.counters.get(self.index.type_code())
    }

    /// Re-synchronize with the live counter after the caller has handled
    /// a detected modification.
    pub fn reset_concurrent_modification(&mut self) {
        self.snapshot = self.counters.get(self.index.type_code());
    }
}

impl std::fmt::Debug for LeafCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafCursor")
            .field("label", &self.index.label())
            .field("type_code", &self.index.type_code())
            .field("pos", &self.pos)
            .field("stale", &self.is_concurrent_modification())
            .finish()
    }
}

/// Cursor over a composite view: one leaf per type in the subtree.
///
/// For ordered kinds the leaves are iterated in rendezvous: every step
/// yields the smallest (or, going backward, largest) entry any leaf is
/// positioned on, so the union reads as one sorted sequence. Bags
/// concatenate leaf by leaf in type-code order. Staleness is per leaf
/// type; the composite reports stale if any of its leaves does.
#[derive(Clone)]
pub struct CompositeCursor {
    kind: IndexKind,
    comparator: ComparatorRef,
    cursors: Vec<LeafCursor>,
    current: Option<usize>,
    forward: bool,
}

impl CompositeCursor {
    pub(crate) fn new(kind: IndexKind, comparator: ComparatorRef, cursors: Vec<LeafCursor>) -> Self {
        let mut cursor = Self {
            kind,
            comparator,
            cursors,
            current: None,
            forward: true,
        };
        cursor.move_to_first();
        cursor
    }

    fn ordered(&self) -> bool {
        matches!(self.kind, IndexKind::Sorted | IndexKind::Set)
    }

    /// Among valid leaf cursors, the one holding the smallest entry.
    fn select_forward(&self) -> Option<usize> {
        let mut best: Option<(usize, Addr)> = None;
        for (i, cur) in self.cursors.iter().enumerate() {
            let Some(v) = cur.get() else { continue };
            best = match best {
                Some((_, held)) if self.comparator.compare(v, held) == Ordering::Less => {
                    Some((i, v))
                }
                Some(kept) => Some(kept),
                None => Some((i, v)),
            };
        }
        best.map(|(i, _)| i)
    }

    /// Among valid leaf cursors, the one holding the largest entry.
    fn select_backward(&self) -> Option<usize> {
        let mut best: Option<(usize, Addr)> = None;
        for (i, cur) in self.cursors.iter().enumerate() {
            let Some(v) = cur.get() else { continue };
            best = match best {
                Some((_, held)) if self.comparator.compare(v, held) == Ordering::Greater => {
                    Some((i, v))
                }
                Some(kept) => Some(kept),
                None => Some((i, v)),
            };
        }
        best.map(|(i, _)| i)
    }

    pub fn is_valid(&self) -> bool {
        self.current
            .map(|i| self.cursors[i].is_valid())
            .unwrap_or(false)
    }

    pub fn get(&self) -> Option<Addr> {
        self.current.and_then(|i| self.cursors[i].get())
    }

    pub fn move_to_first(&mut self) {
        self.forward = true;
        if self.ordered() {
            for cur in &mut self.cursors {
                cur.move_to_first();
            }
            self.current = self.select_forward();
        } else {
            self.current = None;
            for (i, cur) in self.cursors.iter_mut().enumerate() {
                cur.move_to_first();
                if self.current.is_none() && cur.is_valid() {
                    self.current = Some(i);
                }
            }
        }
    }

    pub fn move_to_last(&mut self) {
        self.forward = false;
        if self.ordered() {
            for cur in &mut self.cursors {
                cur.move_to_last();
            }
            self.current = self.select_backward();
        } else {
            self.current = None;
            for (i, cur) in self.cursors.iter_mut().enumerate() {
                cur.move_to_last();
                if cur.is_valid() {
                    self.current = Some(i);
                }
            }
        }
    }

    pub fn move_to_next(&mut self) {
        let Some(ci) = self.current else { return };
        if self.ordered() {
            // On a direction change the other leaves sit one step behind
            // the rendezvous point; advance them before resuming.
            if !self.forward {
                for (i, cur) in self.cursors.iter_mut().enumerate() {
                    if i != ci {
                        cur.move_to_next();
                    }
                }
                self.forward = true;
            }
            self.cursors[ci].move_to_next();
            if let Some(next) = self.select_forward() {
                self.current = Some(next);
            }
            // All leaves exhausted: stay on the now-invalid current leaf
            // so a later move_to_previous can step back in.
        } else {
            self.forward = true;
            self.cursors[ci].move_to_next();
            if !self.cursors[ci].is_valid() {
                for j in ci + 1..self.cursors.len() {
                    if !self.cursors[j].index.is_empty() {
                        self.cursors[j].move_to_first();
                        self.current = Some(j);
                        return;
                    }
                }
            }
        }
    }

    pub fn move_to_previous(&mut self) {
        let Some(ci) = self.current else { return };
        if self.ordered() {
            if self.forward {
                for (i, cur) in self.cursors.iter_mut().enumerate() {
                    if i != ci {
                        cur.move_to_previous();
                    }
                }
                self.forward = false;
            }
            self.cursors[ci].move_to_previous();
            if let Some(prev) = self.select_backward() {
                self.current = Some(prev);
            }
        } else {
            self.forward = false;
            self.cursors[ci].move_to_previous();
            if !self.cursors[ci].is_valid() {
                for j in (0..ci).rev() {
                    if !self.cursors[j].index.is_empty() {
                        self.cursors[j].move_to_last();
                        self.current = Some(j);
                        return;
                    }
                }
            }
        }
    }

    /// Position every leaf at `fs` and rendezvous from there.
    pub fn move_to(&mut self, fs: Addr) {
        self.forward = true;
        for cur in &mut self.cursors {
            cur.move_to(fs);
        }
        self.current = if self.ordered() {
            self.select_forward()
        } else {
            self.cursors.iter().position(|c| c.is_valid())
        };
    }

    /// Duplicate this cursor and all its leaf positions.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Stale if any covered leaf type has been mutated since snapshot.
    pub fn is_concurrent_modification(&self) -> bool {
        self.cursors.iter().any(|c| c.is_concurrent_modification())
    }

    pub fn reset_concurrent_modification(&mut self) {
        for cur in &mut self.cursors {
            cur.reset_concurrent_modification();
        }
    }
}

impl std::fmt::Debug for CompositeCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeCursor")
            .field("kind", &self.kind)
            .field("leaves", &self.cursors.len())
            .field("current", &self.current)
            .finish()
    }
}

/// Cursor over an index view: a single leaf or a composite subtree.
#[derive(Debug, Clone)]
pub enum IndexCursor {
    Leaf(LeafCursor),
    Composite(CompositeCursor),
}

macro_rules! delegate {
    ($self:ident, $cur:ident => $body:expr) => {
        match $self {
            IndexCursor::Leaf($cur) => $body,
            IndexCursor::Composite($cur) => $body,
        }
    };
}

impl IndexCursor {
    pub fn is_valid(&self) -> bool {
        delegate!(self, c => c.is_valid())
    }

    pub fn get(&self) -> Option<Addr> {
        delegate!(self, c => c.get())
    }

    pub fn move_to_first(&mut self) {
        delegate!(self, c => c.move_to_first())
    }

    pub fn move_to_last(&mut self) {
        delegate!(self, c => c.move_to_last())
    }

    pub fn move_to_next(&mut self) {
        delegate!(self, c => c.move_to_next())
    }

    pub fn move_to_previous(&mut self) {
        delegate!(self, c => c.move_to_previous())
    }

    pub fn move_to(&mut self, fs: Addr) {
        delegate!(self, c => c.move_to(fs))
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn is_concurrent_modification(&self) -> bool {
        delegate!(self, c => c.is_concurrent_modification())
    }

    pub fn reset_concurrent_modification(&mut self) {
        delegate!(self, c => c.reset_concurrent_modification())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trellis_core::{ComparatorRef, TypeCode};

    use crate::leaf::LeafIndex;

    fn by_tens() -> ComparatorRef {
        Arc::new(|a: Addr, b: Addr| (a.as_raw() / 10).cmp(&(b.as_raw() / 10)))
    }

    fn leaf_with(kind: IndexKind, t: TypeCode, raws: &[u32]) -> LeafRef {
        let leaf = Arc::new(LeafIndex::new("test", t, kind, by_tens(), 8));
        for &raw in raws {
            leaf.insert(Addr(raw));
        }
        leaf
    }

    fn counters(n: usize) -> Arc<ModCounters> {
        Arc::new(ModCounters::new(n))
    }

    fn drain_forward(cursor: &mut LeafCursor) -> Vec<Addr> {
        let mut out = Vec::new();
        cursor.move_to_first();
        while let Some(fs) = cursor.get() {
            out.push(fs);
            cursor.move_to_next();
        }
        out
    }

    #[test]
    fn test_leaf_cursor_walks_both_ways() {
        let counters = counters(1);
        let leaf = leaf_with(IndexKind::Sorted, TypeCode(0), &[30, 10, 20]);
        let mut cursor = LeafCursor::new(leaf, counters);

        assert_eq!(
            drain_forward(&mut cursor),
            vec![Addr(10), Addr(20), Addr(30)]
        );

        let mut back = Vec::new();
        cursor.move_to_last();
        while let Some(fs) = cursor.get() {
            back.push(fs);
            cursor.move_to_previous();
        }
        assert_eq!(back, vec![Addr(30), Addr(20), Addr(10)]);
    }

    #[test]
    fn test_leaf_cursor_recovers_after_running_off_either_end() {
        let counters = counters(1);
        let leaf = leaf_with(IndexKind::Sorted, TypeCode(0), &[10, 20]);
        let mut cursor = LeafCursor::new(leaf, counters);

        cursor.move_to_first();
        cursor.move_to_previous();
        assert!(!cursor.is_valid());
        cursor.move_to_next();
        assert_eq!(cursor.get(), Some(Addr(10)));

        cursor.move_to_last();
        cursor.move_to_next();
        assert!(!cursor.is_valid());
        cursor.move_to_previous();
        assert_eq!(cursor.get(), Some(Addr(20)));
    }

    #[test]
    fn test_leaf_cursor_move_to_lands_on_key_or_insertion_point() {
        let counters = counters(1);
        let leaf = leaf_with(IndexKind::Sorted, TypeCode(0), &[10, 30, 50]);
        let mut cursor = LeafCursor::new(leaf, counters);

        // Key present: lands on the matching entry.
        cursor.move_to(Addr(35));
        assert_eq!(cursor.get(), Some(Addr(30)));

        // Key absent: lands on the first entry ordering after it.
        cursor.move_to(Addr(20));
        assert_eq!(cursor.get(), Some(Addr(30)));

        // Past every key: lands past the end.
        cursor.move_to(Addr(90));
        assert!(!cursor.is_valid());
    }

    #[test]
    fn test_copy_does_not_share_position() {
        let counters = counters(1);
        let leaf = leaf_with(IndexKind::Sorted, TypeCode(0), &[10, 20, 30]);
        let mut cursor = LeafCursor::new(leaf, counters);
        cursor.move_to_first();

        let mut copied = cursor.copy();
        copied.move_to_next();
        assert_eq!(cursor.get(), Some(Addr(10)));
        assert_eq!(copied.get(), Some(Addr(20)));
    }

    #[test]
    fn test_staleness_snapshot_and_reset() {
        let counters = counters(1);
        let leaf = leaf_with(IndexKind::Sorted, TypeCode(0), &[10]);
        let mut cursor = LeafCursor::new(leaf.clone(), counters.clone());

        assert!(!cursor.is_concurrent_modification());
        // The counter protocol is advisory; the repository bumps on
        // mutation, modeled here directly.
        leaf.insert(Addr(20));
        counters.bump(TypeCode(0));
        assert!(cursor.is_concurrent_modification());

        cursor.reset_concurrent_modification();
        assert!(!cursor.is_concurrent_modification());
    }

    #[test]
    fn test_composite_rendezvous_merges_sorted_leaves() {
        let counters = counters(2);
        let a = leaf_with(IndexKind::Sorted, TypeCode(0), &[10, 40]);
        let b = leaf_with(IndexKind::Sorted, TypeCode(1), &[20, 30]);
        let cursors = vec![
            LeafCursor::new(a, counters.clone()),
            LeafCursor::new(b, counters),
        ];
        let mut cursor = CompositeCursor::new(IndexKind::Sorted, by_tens(), cursors);

        let mut seen = Vec::new();
        cursor.move_to_first();
        while let Some(fs) = cursor.get() {
            seen.push(fs);
            cursor.move_to_next();
        }
        assert_eq!(seen, vec![Addr(10), Addr(20), Addr(30), Addr(40)]);
    }

    #[test]
    fn test_composite_direction_change_mid_walk() {
        let counters = counters(2);
        let a = leaf_with(IndexKind::Sorted, TypeCode(0), &[10, 40]);
        let b = leaf_with(IndexKind::Sorted, TypeCode(1), &[20, 30]);
        let cursors = vec![
            LeafCursor::new(a, counters.clone()),
            LeafCursor::new(b, counters),
        ];
        let mut cursor = CompositeCursor::new(IndexKind::Sorted, by_tens(), cursors);

        cursor.move_to_first();
        cursor.move_to_next();
        cursor.move_to_next();
        assert_eq!(cursor.get(), Some(Addr(30)));

        cursor.move_to_previous();
        assert_eq!(cursor.get(), Some(Addr(20)));
        cursor.move_to_previous();
        assert_eq!(cursor.get(), Some(Addr(10)));

        cursor.move_to_next();
        assert_eq!(cursor.get(), Some(Addr(20)));
    }

    #[test]
    fn test_composite_bag_concatenates_in_leaf_order() {
        let counters = counters(2);
        let a = leaf_with(IndexKind::Bag, TypeCode(0), &[40, 10]);
        let b = leaf_with(IndexKind::Bag, TypeCode(1), &[30, 20]);
        let cursors = vec![
            LeafCursor::new(a, counters.clone()),
            LeafCursor::new(b, counters),
        ];
        let mut cursor = CompositeCursor::new(IndexKind::Bag, by_tens(), cursors);

        let mut seen = Vec::new();
        cursor.move_to_first();
        while let Some(fs) = cursor.get() {
            seen.push(fs);
            cursor.move_to_next();
        }
        // Insertion order within each leaf, leaves in order.
        assert_eq!(seen, vec![Addr(40), Addr(10), Addr(30), Addr(20)]);

        let mut back = Vec::new();
        cursor.move_to_last();
        while let Some(fs) = cursor.get() {
            back.push(fs);
            cursor.move_to_previous();
        }
        back.reverse();
        assert_eq!(back, seen);
    }

    #[test]
    fn test_composite_skips_empty_leaves() {
        let counters = counters(3);
        let a = leaf_with(IndexKind::Sorted, TypeCode(0), &[]);
        let b = leaf_with(IndexKind::Sorted, TypeCode(1), &[20]);
        let c = leaf_with(IndexKind::Sorted, TypeCode(2), &[]);
        let cursors = vec![
            LeafCursor::new(a, counters.clone()),
            LeafCursor::new(b, counters.clone()),
            LeafCursor::new(c, counters),
        ];
        let mut cursor = CompositeCursor::new(IndexKind::Sorted, by_tens(), cursors);
        cursor.move_to_first();
        assert_eq!(cursor.get(), Some(Addr(20)));
        cursor.move_to_next();
        assert!(!cursor.is_valid());
    }

    #[test]
    fn test_composite_staleness_is_per_leaf_type() {
        let counters = counters(2);
        let a = leaf_with(IndexKind::Sorted, TypeCode(0), &[10]);
        let b = leaf_with(IndexKind::Sorted, TypeCode(1), &[20]);
        let cursors = vec![
            LeafCursor::new(a, counters.clone()),
            LeafCursor::new(b, counters.clone()),
        ];
        let mut cursor = CompositeCursor::new(IndexKind::Sorted, by_tens(), cursors);

        assert!(!cursor.is_concurrent_modification());
        // Mutating either covered type makes the composite stale.
        counters.bump(TypeCode(1));
        assert!(cursor.is_concurrent_modification());
        cursor.reset_concurrent_modification();
        assert!(!cursor.is_concurrent_modification());
    }
}
