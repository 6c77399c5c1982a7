//! Bounded parallel task execution with ordered results.
//!
//! At most `limit` tasks run at once; the rest wait on a fair semaphore,
//! so they start in submission order as running tasks finish. Results come
//! back in the same order as the input list, letting callers correlate
//! outcomes to inputs positionally regardless of completion order.
//!
//! Tasks are expected to capture their own failures into their output
//! value (the sync engine returns `DownloadOutcome`s); one task's failure
//! therefore never cancels or blocks its siblings.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

/// Run `tasks` with at most `limit` executing concurrently.
///
/// Results are returned in submission order.
pub async fn run_limited<F, T>(tasks: Vec<F>, limit: usize) -> Vec<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let handles: Vec<_> = tasks
        .into_iter()
        .map(|task| {
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("download semaphore closed");
                task.await
            })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("download task panicked"))
        .collect()
}
