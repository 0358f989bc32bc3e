// src/parallel.rs

//! Bounded-concurrency runner for the initial bulk load.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Run `tasks` with at most `limit` executing concurrently, and wait until
/// all of them have completed.
///
/// This is a pure concurrency limiter, not a failure boundary: the tasks are
/// expected to absorb their own errors (the load boundary maps failures to
/// empty cache contributions before they get here), so nothing is returned.
/// A panicking task is reported and does not abort the batch. A `limit` of
/// zero is clamped to one.
pub async fn run_limited<F>(tasks: Vec<F>, limit: usize)
where
    F: Future<Output = ()> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut set = JoinSet::new();

    for task in tasks {
        // Acquire before spawning, so at most `limit` tasks are live.
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            // The semaphore is never closed; bail out instead of panicking
            // if that invariant is ever broken.
            Err(_) => break,
        };
        set.spawn(async move {
            task.await;
            drop(permit);
        });
    }

    while let Some(joined) = set.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "bulk load task panicked");
        }
    }
}
