//! Bounded worker pool for batched LLM requests.
//!
//! Batches are pulled from a shared counter by at most `max_workers`
//! threads; results come back over a channel and are merged into the cache
//! one at a time, each merge followed by a flush.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};

use serde_json::Value;

use super::LlmError;
use crate::cache::JsonCache;
use crate::config::LlmConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub max_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            batch_size: 20,
            max_workers: 20,
        }
    }
}

impl From<&LlmConfig> for BatchConfig {
    fn from(config: &LlmConfig) -> Self {
        BatchConfig {
            batch_size: config.batch_size,
            max_workers: config.max_workers,
        }
    }
}

/// Outcome of one batched run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Cache entries written
    pub merged: usize,
}

/// Dispatch `items` in batches and merge every successful result into
/// `cache`. `dispatch` receives the batch and its 1-based number.
///
/// Failed batches are logged and skipped; their items stay missing from the
/// cache so a later run picks them up again.
pub fn run_batches<T, F>(
    items: &[T],
    config: BatchConfig,
    cache: &Mutex<JsonCache>,
    dispatch: F,
) -> BatchReport
where
    T: Sync,
    F: Fn(&[T], usize) -> Result<BTreeMap<String, Value>, LlmError> + Sync,
{
    let batches: Vec<&[T]> = items.chunks(config.batch_size.max(1)).collect();
    let mut report = BatchReport {
        batches: batches.len(),
        ..Default::default()
    };
    if batches.is_empty() {
        return report;
    }

    let workers = config.max_workers.clamp(1, batches.len());
    log::info!(
        "Dispatching {} items in {} batches on {} workers",
        items.len(),
        batches.len(),
        workers
    );

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Result<BTreeMap<String, Value>, LlmError>)>();

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let tx = tx.clone();
            let (next, batches, dispatch) = (&next, &batches, &dispatch);
            let spawned = std::thread::Builder::new()
                .name(format!("llm-batch-{}", worker))
                .spawn_scoped(scope, move || loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(&batch) = batches.get(index) else {
                        break;
                    };
                    if tx.send((index + 1, dispatch(batch, index + 1))).is_err() {
                        break;
                    }
                });
            if let Err(e) = spawned {
                log::warn!("Failed to spawn batch worker {}: {}", worker, e);
            }
        }
        drop(tx);

        for (batch_id, result) in rx {
            match result {
                Ok(results) => {
                    report.succeeded += 1;
                    if results.is_empty() {
                        log::debug!("[Batch {}] Empty result", batch_id);
                        continue;
                    }
                    let mut guard = match cache.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    let merged = guard.extend(results);
                    report.merged += merged;
                    if let Err(e) = guard.flush() {
                        log::warn!("[Batch {}] Failed to persist cache: {:#}", batch_id, e);
                    }
                    log::info!("[Batch {}] Merged {} entries", batch_id, merged);
                }
                Err(e) => {
                    report.failed += 1;
                    log::warn!("[Batch {}] Failed: {}", batch_id, e);
                }
            }
        }
    });

    log::info!(
        "Batches done: {} succeeded, {} failed, {} entries merged",
        report.succeeded,
        report.failed,
        report.merged
    );
    report
}
