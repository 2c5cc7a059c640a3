//! Action batch compaction
//!
//! A batch of creations and deletions is reduced to its net effect. Actions
//! are bucketed by `(path, hash)`; inside a bucket every deletion cancels one
//! creation and vice versa, independent of where they sit in the batch.
//! Survivors keep their relative input order.
//!
//! Only the counts are order-insensitive. Which instances survive a bucket
//! with unequal counts is decided by the [`SurvivorPolicy`]:
//!
//! - [`SurvivorPolicy::TraversalOrder`] walks the batch once and keeps an
//!   action when no opposing tally is left for it. For `c1 c2 d1` (all in one
//!   bucket) `c1` consumes the only deletion tally and `c2` survives, even if
//!   `c1` carries the later timestamp.
//! - [`SurvivorPolicy::MostRecent`] keeps the surplus actions with the latest
//!   `created_at`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::FileAction;

/// How surviving instances are chosen in a bucket with unequal counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurvivorPolicy {
    /// Keep the actions the cancellation pass fails to pair
    #[default]
    #[serde(rename = "traversal")]
    TraversalOrder,
    /// Keep the surplus actions with the latest timestamps
    #[serde(rename = "most_recent")]
    MostRecent,
}

/// Counters describing one compaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionStats {
    /// Actions in the raw batch
    pub input: usize,
    /// Actions left after cancellation
    pub survivors: usize,
    /// Actions dropped as cancelled pairs
    pub cancelled: usize,
}

/// Reduces raw action batches to their net effect
#[derive(Debug, Clone, Copy, Default)]
pub struct Compactor {
    policy: SurvivorPolicy,
}

impl Compactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SurvivorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SurvivorPolicy {
        self.policy
    }

    /// Compact `actions`, returning the survivors in input order.
    pub fn compact(&self, actions: &[FileAction]) -> Vec<FileAction> {
        let keep = match self.policy {
            SurvivorPolicy::TraversalOrder => traversal_survivors(actions),
            SurvivorPolicy::MostRecent => most_recent_survivors(actions),
        };

        actions
            .iter()
            .zip(keep)
            .filter_map(|(action, keep)| keep.then(|| action.clone()))
            .collect()
    }

    /// Like [`Compactor::compact`], also reporting how much was cancelled.
    pub fn compact_with_stats(&self, actions: &[FileAction]) -> (Vec<FileAction>, CompactionStats) {
        let simplified = self.compact(actions);
        let stats = CompactionStats {
            input: actions.len(),
            survivors: simplified.len(),
            cancelled: actions.len() - simplified.len(),
        };
        tracing::debug!(
            policy = ?self.policy,
            input = stats.input,
            survivors = stats.survivors,
            "Compacted action batch"
        );
        (simplified, stats)
    }
}

/// Compact `actions` with the default [`SurvivorPolicy::TraversalOrder`].
pub fn compact(actions: &[FileAction]) -> Vec<FileAction> {
    Compactor::new().compact(actions)
}

fn traversal_survivors(actions: &[FileAction]) -> Vec<bool> {
    let mut tally = HashMap::new();
    for action in actions {
        *tally.entry(action.key()).or_insert(0usize) += 1;
    }

    actions
        .iter()
        .map(|action| match tally.get_mut(&action.key().opposing()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .collect()
}

#[derive(Default)]
struct Bucket {
    creates: Vec<usize>,
    deletes: Vec<usize>,
}

fn most_recent_survivors(actions: &[FileAction]) -> Vec<bool> {
    let mut buckets: HashMap<(&str, &str), Bucket> = HashMap::new();
    for (index, action) in actions.iter().enumerate() {
        let bucket = buckets.entry((action.path(), action.hash())).or_default();
        if action.is_create {
            bucket.creates.push(index);
        } else {
            bucket.deletes.push(index);
        }
    }

    let mut keep = vec![false; actions.len()];
    for bucket in buckets.into_values() {
        let (mut surplus, net) = if bucket.creates.len() >= bucket.deletes.len() {
            let net = bucket.creates.len() - bucket.deletes.len();
            (bucket.creates, net)
        } else {
            let net = bucket.deletes.len() - bucket.creates.len();
            (bucket.deletes, net)
        };

        // Latest first; later input position wins a timestamp tie
        surplus.sort_by(|&a, &b| {
            (actions[b].created_at, b).cmp(&(actions[a].created_at, a))
        });
        for index in surplus.into_iter().take(net) {
            keep[index] = true;
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::File;
    use chrono::{TimeZone, Utc};

    fn create(path: &str, hash: &str) -> FileAction {
        FileAction::create(File::new(path, hash))
    }

    fn delete(path: &str, hash: &str) -> FileAction {
        FileAction::delete(File::new(path, hash))
    }

    fn at(action: FileAction, secs: i64) -> FileAction {
        action.with_created_at(Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn empty_batch_compacts_to_empty() {
        assert!(compact(&[]).is_empty());
    }

    #[test]
    fn create_then_delete_cancels() {
        assert!(compact(&[create("a", "H"), delete("a", "H")]).is_empty());
        assert!(compact(&[delete("a", "H"), create("a", "H")]).is_empty());
    }

    #[test]
    fn same_path_different_hash_does_not_cancel() {
        let batch = vec![create("a", "H1"), delete("a", "H2")];
        assert_eq!(compact(&batch), batch);
    }

    #[test]
    fn same_direction_never_cancels() {
        let batch = vec![create("a", "H"), create("a", "H")];
        assert_eq!(compact(&batch), batch);
    }

    #[test]
    fn traversal_keeps_last_unpaired_create() {
        let batch = vec![at(create("a", "H"), 1), at(delete("a", "H"), 2), at(create("a", "H"), 3)];
        let out = compact(&batch);
        assert_eq!(out, vec![batch[2].clone()]);
    }

    #[test]
    fn traversal_may_keep_older_instance() {
        // The first create consumes the only deletion tally, so the second
        // (older) create is the one left unpaired.
        let batch = vec![at(create("a", "H"), 5), at(create("a", "H"), 1), at(delete("a", "H"), 9)];
        let out = compact(&batch);
        assert_eq!(out, vec![batch[1].clone()]);
        assert!(out[0].created_at < batch[0].created_at);
    }

    #[test]
    fn most_recent_keeps_latest_instance() {
        let batch = vec![at(create("a", "H"), 5), at(create("a", "H"), 1), at(delete("a", "H"), 9)];
        let out = Compactor::with_policy(SurvivorPolicy::MostRecent).compact(&batch);
        assert_eq!(out, vec![batch[0].clone()]);
    }

    #[test]
    fn most_recent_breaks_ties_by_position() {
        let batch = vec![at(delete("a", "H"), 1), at(delete("a", "H"), 1), at(create("a", "H"), 1)];
        let out = Compactor::with_policy(SurvivorPolicy::MostRecent).compact(&batch);
        assert_eq!(out, vec![batch[1].clone()]);
    }

    #[test]
    fn stats_count_cancelled_actions() {
        let batch = vec![create("a", "H"), delete("a", "H"), create("b", "H")];
        let (out, stats) = Compactor::new().compact_with_stats(&batch);

        assert_eq!(out.len(), 1);
        assert_eq!(
            stats,
            CompactionStats {
                input: 3,
                survivors: 1,
                cancelled: 2
            }
        );
    }
}
