//! Bounded-concurrency batch delivery.
//!
//! Every target gets its own task. A counting gate admits at most
//! `max_concurrency` of them into delivery at once; the rest wait for a slot.
//! Each admitted target runs its own retry loop against the
//! [`DeliveryChannel`] and reports exactly one [`DispatchItemResult`] over an
//! mpsc channel, cancellation included.
//!
//! Cancellation is cooperative. The caller's token is checked through a child
//! token that strict mode also cancels on the first non-sent outcome. Tasks
//! observe it while waiting for a slot, before each attempt and during each
//! retry wait; an attempt already in flight is allowed to finish.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::DispatchConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{DispatchItemResult, DispatchMode, DispatchResult, DispatchStatus};

use super::channel::DeliveryChannel;
use super::retry::{ErrorClass, RetryDecision, RetryPolicy};

/// Sends one logical delivery to many targets.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::dispatch::{BatchSender, DeliveryChannel};
/// use payroll_engine::models::DispatchMode;
/// use tokio_util::sync::CancellationToken;
///
/// async fn notify<C: DeliveryChannel + 'static>(channel: C) {
///     let sender = BatchSender::new(channel);
///     let cancel = CancellationToken::new();
///     let report = sender
///         .send_batch(&[1, 2, 3], DispatchMode::BestEffortContinue, 10, &cancel)
///         .await
///         .unwrap();
///     println!("sent {} of {}", report.sent(), report.total());
/// }
/// ```
#[derive(Debug)]
pub struct BatchSender<C> {
    channel: Arc<C>,
    policy: RetryPolicy,
    config: DispatchConfig,
}

impl<C: DeliveryChannel + 'static> BatchSender<C> {
    /// Creates a sender with default settings.
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, DispatchConfig::default())
    }

    /// Creates a sender whose retry policy and defaults come from `config`.
    pub fn with_config(channel: C, config: DispatchConfig) -> Self {
        Self {
            channel: Arc::new(channel),
            policy: RetryPolicy::from(&config),
            config,
        }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the retry policy applied to every target.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends a batch using the configured mode and concurrency limit.
    pub async fn send_batch_default(
        &self,
        target_ids: &[u32],
        cancellation: &CancellationToken,
    ) -> EngineResult<DispatchResult> {
        self.send_batch(
            target_ids,
            self.config.default_mode,
            self.config.max_concurrency,
            cancellation,
        )
        .await
    }

    /// Delivers to every target and reports one outcome per target.
    ///
    /// Returns only after every target has resolved. Outcomes are listed in
    /// the order of `target_ids`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if `max_concurrency` is 0.
    /// Delivery failures never surface here; they are recorded per target.
    pub async fn send_batch(
        &self,
        target_ids: &[u32],
        mode: DispatchMode,
        max_concurrency: usize,
        cancellation: &CancellationToken,
    ) -> EngineResult<DispatchResult> {
        if max_concurrency == 0 {
            return Err(EngineError::InvalidConcurrency {
                value: max_concurrency,
            });
        }

        let batch_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start_time = Instant::now();
        info!(
            batch_id = %batch_id,
            targets = target_ids.len(),
            mode = ?mode,
            max_concurrency,
            "Dispatching batch"
        );

        let stop = cancellation.child_token();
        let gate = Arc::new(Semaphore::new(max_concurrency));
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();

        for (index, &target_id) in target_ids.iter().enumerate() {
            let channel = Arc::clone(&self.channel);
            let gate = Arc::clone(&gate);
            let stop = stop.clone();
            let results_tx = results_tx.clone();
            let policy = self.policy;

            tasks.spawn(async move {
                let outcome = tokio::select! {
                    biased;
                    _ = stop.cancelled() => DispatchItemResult::cancelled(target_id, 0),
                    permit = gate.acquire_owned() => match permit {
                        Ok(_permit) => deliver_target(&*channel, target_id, policy, &stop).await,
                        Err(_) => DispatchItemResult::cancelled(target_id, 0),
                    },
                };

                if mode == DispatchMode::StrictStopOnFailure
                    && !outcome.is_sent()
                    && !stop.is_cancelled()
                {
                    warn!(
                        batch_id = %batch_id,
                        target_id,
                        status = ?outcome.status,
                        "Stopping batch after first failed target"
                    );
                    stop.cancel();
                }

                // The receiver is held until every task has been joined.
                let _ = results_tx.send((index, outcome));
            });
        }
        drop(results_tx);

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!(batch_id = %batch_id, error = %err, "Delivery task aborted");
                if mode == DispatchMode::StrictStopOnFailure {
                    stop.cancel();
                }
            }
        }

        let mut slots: Vec<Option<DispatchItemResult>> = vec![None; target_ids.len()];
        while let Some((index, outcome)) = results_rx.recv().await {
            slots[index] = Some(outcome);
        }

        let item_results: Vec<DispatchItemResult> = slots
            .into_iter()
            .zip(target_ids)
            .map(|(slot, &target_id)| {
                slot.unwrap_or_else(|| {
                    DispatchItemResult::failed(
                        target_id,
                        DispatchStatus::FailedPermanent,
                        0,
                        "delivery task aborted before reporting",
                    )
                })
            })
            .collect();

        let result = DispatchResult::new(batch_id, item_results, started_at, Utc::now());
        info!(
            batch_id = %batch_id,
            total = result.total(),
            sent = result.sent(),
            failed = result.failed(),
            cancelled = result.count_status(DispatchStatus::Cancelled),
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Batch dispatch completed"
        );

        Ok(result)
    }
}

/// Runs one target's retry loop to a terminal state.
async fn deliver_target<C: DeliveryChannel + ?Sized>(
    channel: &C,
    target_id: u32,
    policy: RetryPolicy,
    stop: &CancellationToken,
) -> DispatchItemResult {
    let mut attempt: u32 = 0;

    loop {
        if stop.is_cancelled() {
            return DispatchItemResult::cancelled(target_id, attempt);
        }

        attempt += 1;
        let error = match channel.deliver(target_id, stop).await {
            Ok(()) => {
                debug!(target_id, attempt, "Delivered");
                return DispatchItemResult::sent(target_id, attempt);
            }
            Err(error) => error,
        };

        match policy.decide(ErrorClass::from(&error), attempt) {
            RetryDecision::RetryAfter { delay, kind } => {
                debug!(
                    target_id,
                    attempt,
                    delay = ?delay,
                    wait = ?kind,
                    error = %error,
                    "Delivery failed, retrying"
                );
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => {
                        return DispatchItemResult::cancelled(target_id, attempt);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            RetryDecision::FailTransient { rate_limited } => {
                let message = if rate_limited {
                    format!(
                        "retry budget of {} attempts exhausted while rate limited",
                        attempt
                    )
                } else {
                    format!("retry budget of {} attempts exhausted: {}", attempt, error)
                };
                warn!(target_id, attempt, error = %error, "Delivery failed after retries");
                return DispatchItemResult::failed(
                    target_id,
                    DispatchStatus::FailedTransient,
                    attempt,
                    message,
                );
            }
            RetryDecision::FailPermanent => {
                warn!(target_id, attempt, error = %error, "Delivery rejected");
                return DispatchItemResult::failed(
                    target_id,
                    DispatchStatus::FailedPermanent,
                    attempt,
                    error.to_string(),
                );
            }
            RetryDecision::Cancelled => {
                return DispatchItemResult::cancelled(target_id, attempt);
            }
        }
    }
}
