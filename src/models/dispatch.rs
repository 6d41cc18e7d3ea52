//! Dispatch models produced by the batch sender.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a batch reacts to a target's terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Keep delivering to every other target.
    #[default]
    BestEffortContinue,
    /// Stop starting new work once any target resolves without being sent.
    StrictStopOnFailure,
}

/// Terminal state of a single target's delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    /// Delivered.
    Sent,
    /// Retry budget exhausted on transient or rate-limited failures.
    FailedTransient,
    /// Rejected with a non-retryable failure.
    FailedPermanent,
    /// Abandoned after observing cancellation.
    Cancelled,
}

/// Outcome for one target of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchItemResult {
    /// The target this outcome belongs to.
    pub target_id: u32,
    /// The terminal state reached.
    pub status: DispatchStatus,
    /// Delivery attempts started before reaching the terminal state.
    pub attempts: u32,
    /// Why the target was not sent.
    pub error_message: Option<String>,
}

impl DispatchItemResult {
    /// A delivered target.
    pub fn sent(target_id: u32, attempts: u32) -> Self {
        Self {
            target_id,
            status: DispatchStatus::Sent,
            attempts,
            error_message: None,
        }
    }

    /// A target that reached a failure state.
    pub fn failed(
        target_id: u32,
        status: DispatchStatus,
        attempts: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target_id,
            status,
            attempts,
            error_message: Some(message.into()),
        }
    }

    /// A target abandoned after observing cancellation.
    pub fn cancelled(target_id: u32, attempts: u32) -> Self {
        Self::failed(
            target_id,
            DispatchStatus::Cancelled,
            attempts,
            "cancelled before delivery completed",
        )
    }

    /// Returns true if the target was delivered.
    pub fn is_sent(&self) -> bool {
        self.status == DispatchStatus::Sent
    }
}

/// The full accounting of a batch.
///
/// Every requested target has exactly one item, in the order the targets were
/// given, and `total == sent + failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    batch_id: Uuid,
    total: usize,
    sent: usize,
    failed: usize,
    item_results: Vec<DispatchItemResult>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl DispatchResult {
    /// Tallies the items of a finished batch.
    pub fn new(
        batch_id: Uuid,
        item_results: Vec<DispatchItemResult>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let total = item_results.len();
        let sent = item_results.iter().filter(|item| item.is_sent()).count();
        Self {
            batch_id,
            total,
            sent,
            failed: total - sent,
            item_results,
            started_at,
            completed_at,
        }
    }

    /// Correlation id of this batch, also recorded in its log events.
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    /// Number of targets in the batch.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of targets delivered.
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Number of targets not delivered, cancelled ones included.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Per-target outcomes in input order.
    pub fn item_results(&self) -> &[DispatchItemResult] {
        &self.item_results
    }

    /// When the batch started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the last target resolved.
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Returns the first outcome recorded for a target.
    pub fn item(&self, target_id: u32) -> Option<&DispatchItemResult> {
        self.item_results
            .iter()
            .find(|item| item.target_id == target_id)
    }

    /// Iterates over targets that were not delivered.
    pub fn failed_items(&self) -> impl Iterator<Item = &DispatchItemResult> {
        self.item_results.iter().filter(|item| !item.is_sent())
    }

    /// Counts targets that ended in the given state.
    pub fn count_status(&self, status: DispatchStatus) -> usize {
        self.item_results
            .iter()
            .filter(|item| item.status == status)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(items: Vec<DispatchItemResult>) -> DispatchResult {
        let now = Utc::now();
        DispatchResult::new(Uuid::new_v4(), items, now, now)
    }

    #[test]
    fn test_tally_counts_cancelled_as_failed() {
        let result = build(vec![
            DispatchItemResult::sent(1, 1),
            DispatchItemResult::failed(2, DispatchStatus::FailedPermanent, 1, "rejected"),
            DispatchItemResult::cancelled(3, 0),
        ]);

        assert_eq!(result.total(), 3);
        assert_eq!(result.sent(), 1);
        assert_eq!(result.failed(), 2);
        assert_eq!(result.count_status(DispatchStatus::Cancelled), 1);
    }

    #[test]
    fn test_failed_items_excludes_sent() {
        let result = build(vec![
            DispatchItemResult::sent(1, 1),
            DispatchItemResult::failed(2, DispatchStatus::FailedTransient, 3, "timeout"),
        ]);

        let failed: Vec<u32> = result.failed_items().map(|item| item.target_id).collect();
        assert_eq!(failed, vec![2]);
    }

    #[test]
    fn test_item_lookup_by_target() {
        let result = build(vec![
            DispatchItemResult::sent(10, 2),
            DispatchItemResult::sent(20, 1),
        ]);

        assert_eq!(result.item(10).unwrap().attempts, 2);
        assert!(result.item(30).is_none());
    }

    #[test]
    fn test_empty_batch() {
        let result = build(vec![]);
        assert_eq!(result.total(), 0);
        assert_eq!(result.sent(), 0);
        assert_eq!(result.failed(), 0);
    }

    #[test]
    fn test_cancelled_item_keeps_attempt_count() {
        let item = DispatchItemResult::cancelled(4, 2);
        assert_eq!(item.status, DispatchStatus::Cancelled);
        assert_eq!(item.attempts, 2);
        assert!(item.error_message.is_some());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let item = DispatchItemResult::failed(5, DispatchStatus::FailedTransient, 3, "busy");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["status"], "failed_transient");
        assert_eq!(json["attempts"], 3);
    }
}
