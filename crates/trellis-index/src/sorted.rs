//! Sorted-container algorithms: binary-search insertion, key search, and
//! identity-precise removal.
//!
//! Removal is the subtle operation here. Several distinct records can
//! share a sort key, and the comparator cannot tell them apart, so a
//! key-level binary search only lands *somewhere* in the equal-key run.
//! [`refine_to_exact`] then scans outward through the run for the entry
//! whose address is identity-equal to the one being removed, and only
//! that entry leaves the container. Insertion stays cheap and key-level;
//! removal pays for the precision.

use std::cmp::Ordering;

use trellis_core::{Addr, FsComparator};

/// Binary search by key.
///
/// Returns `Ok(pos)` with the position of *some* entry whose key equals
/// `fs`'s key (which one, among several equal-key entries, is
/// unspecified), or `Err(ip)` with the insertion point that keeps the
/// container sorted. The two `Err` arms of the single-element span differ
/// by one: a key ordering below the probed entry yields that entry's
/// position, above it yields the position after.
pub(crate) fn search(cmp: &dyn FsComparator, items: &[Addr], fs: Addr) -> Result<usize, usize> {
    let mut start: isize = 0;
    let mut end: isize = items.len() as isize - 1;
    while start <= end {
        let i = ((start + end) / 2) as usize;
        let ord = cmp.compare(fs, items[i]);
        if ord == Ordering::Equal {
            return Ok(i);
        }
        if start == end {
            return match ord {
                Ordering::Less => Err(i),
                _ => Err(i + 1),
            };
        }
        if ord == Ordering::Less {
            end = i as isize - 1;
        } else {
            start = i as isize + 1;
        }
    }
    // Empty input span.
    Err(start as usize)
}

/// Insert keeping the container sorted.
///
/// Fast path: a key at or above the current maximum appends in O(1),
/// which makes mostly-ascending workloads cheap. Duplicate keys are
/// permitted; an entry equal in key to an existing one lands directly
/// after it.
pub(crate) fn insert(cmp: &dyn FsComparator, items: &mut Vec<Addr>, fs: Addr) {
    let len = items.len();
    if len == 0 {
        items.push(fs);
        return;
    }
    if cmp.compare(items[len - 1], fs) == Ordering::Less {
        items.push(fs);
        return;
    }
    match search(cmp, items, fs) {
        Ok(pos) => items.insert(pos + 1, fs),
        Err(ip) => items.insert(ip, fs),
    }
}

/// Scan outward from `start` through the contiguous equal-key run for the
/// entry whose address is identity-equal to `fs`.
///
/// `start` must point at an entry whose key equals `fs`'s key. Searches
/// downward first, then upward, stopping in each direction as soon as the
/// key changes. Returns the position of the identity match, or `None` if
/// no entry in the run is `fs` itself.
pub(crate) fn refine_to_exact(
    cmp: &dyn FsComparator,
    items: &[Addr],
    fs: Addr,
    start: usize,
) -> Option<usize> {
    let mut pos = start as isize;
    while pos >= 0 {
        let v = items[pos as usize];
        if v == fs {
            return Some(pos as usize);
        }
        if cmp.compare(v, fs) != Ordering::Equal {
            break;
        }
        pos -= 1;
    }
    for p in start + 1..items.len() {
        let v = items[p];
        if v == fs {
            return Some(p);
        }
        if cmp.compare(v, fs) != Ordering::Equal {
            break;
        }
    }
    None
}

/// Remove the entry identity-equal to `fs`, if present.
///
/// Removes at most one entry, and only the exact record, never a
/// different record that merely shares the key. Returns whether the
/// container changed; absence is not an error.
pub(crate) fn remove(cmp: &dyn FsComparator, items: &mut Vec<Addr>, fs: Addr) -> bool {
    let pos = match search(cmp, items, fs) {
        Ok(pos) => pos,
        Err(_) => return false,
    };
    match refine_to_exact(cmp, items, fs, pos) {
        Some(exact) => {
            items.remove(exact);
            true
        }
        None => false,
    }
}
