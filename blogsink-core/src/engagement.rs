//! Toggle-like bookkeeping shared by post and comment likes.
//!
//! Both entities keep a single set of liker ids; the like count is the size
//! of the set, so the count can never drift from the membership.

use std::collections::BTreeSet;

/// Toggles `user_id`'s membership in a liker set. Returns `true` when the
/// user likes the entity after the call, `false` when the like was removed.
pub fn toggle(liked_by: &mut BTreeSet<i64>, user_id: i64) -> bool {
    if liked_by.remove(&user_id) {
        return false;
    }
    liked_by.insert(user_id);
    true
}
