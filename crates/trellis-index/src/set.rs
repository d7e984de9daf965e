//! Set-container algorithms: sorted storage with at most one entry per
//! distinct comparator key.
//!
//! A set index shares the sorted container's search and removal machinery
//! (removal is identity-precise there too); only insertion differs. The
//! first record inserted for a key wins; later same-key inserts are
//! silently absorbed, not errors.

use trellis_core::{Addr, FsComparator};

use crate::sorted;

/// Insert unless an entry with this key is already present.
///
/// Returns whether the container changed.
pub(crate) fn insert(cmp: &dyn FsComparator, items: &mut Vec<Addr>, fs: Addr) -> bool {
    match sorted::search(cmp, items, fs) {
        Ok(_) => false,
        Err(ip) => {
            items.insert(ip, fs);
            true
        }
    }
}
