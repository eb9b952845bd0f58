use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, timeout};

/// Interval for waits that reconcile an object's existence (creation,
/// deletion).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Interval for waits that reconcile status published by a controller;
/// status convergence is slow, so polling is relaxed.
pub const STATUS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum PollError<E: std::error::Error + 'static> {
    #[error("condition was not met before the deadline")]
    DeadlineExceeded,

    #[error(transparent)]
    Predicate(#[from] E),
}

/// Invokes `predicate` immediately and then once per `interval` until it
/// yields `Ok(true)`, it fails, or the absolute `deadline` from the call
/// expires. A predicate error always terminates the wait.
pub async fn poll_until<F, Fut, E>(
    interval: Duration,
    deadline: Duration,
    mut predicate: F,
) -> Result<(), PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + 'static,
{
    let ticks = async {
        loop {
            match predicate().await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(err) => return Err(PollError::Predicate(err)),
            }

            sleep(interval).await;
        }
    };

    match timeout(deadline, ticks).await {
        Ok(result) => result,
        Err(_elapsed) => Err(PollError::DeadlineExceeded),
    }
}
