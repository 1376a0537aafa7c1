//! Membership-change detection and profile cleanup.
//!
//! Fires on every class update. Produces no notification record; the only
//! effect is retracting the class back-reference from each kicked user's
//! profile.

use std::sync::Arc;

use classbell_store::DocumentStore;

use crate::triggers::ClassChange;

/// Members removed by an update. Empty unless the member list strictly
/// shrank: additions, no-changes, and same-size swaps are not kicks.
pub fn kicked_members(before: &[String], after: &[String]) -> Vec<String> {
    if after.len() >= before.len() {
        return Vec::new();
    }
    before
        .iter()
        .filter(|member| !after.contains(member))
        .cloned()
        .collect()
}

/// Handle an update to `classes/{class_id}`.
pub async fn on_class_updated(
    store: &Arc<dyn DocumentStore>,
    class_id: &str,
    change: &ClassChange,
) {
    let kicked = kicked_members(&change.before.members, &change.after.members);
    if kicked.is_empty() {
        tracing::debug!("No members were kicked from class {class_id}");
        return;
    }

    tracing::info!("Kicking members from {class_id}: {}", kicked.join(", "));
    let cleanups = kicked.iter().map(|user_id| async move {
        if let Err(e) = store.remove_joined_class(user_id, class_id).await {
            tracing::error!("Failed to clean up profile for {user_id}: {e}");
        }
    });
    futures::future::join_all(cleanups).await;
    tracing::info!("Cleaned up profiles for kicked members of {class_id}");
}
