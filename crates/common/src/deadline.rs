use std::future::Future;
use std::time::Duration;

/// Collaborator errors that can represent an elapsed call deadline
pub trait TimedOut {
    fn timed_out(after: Duration) -> Self;
}

/// Run a collaborator call under a deadline.
///  An elapsed deadline surfaces as the collaborator's own
///  timeout error and is never retried.
pub(crate) async fn bounded<T, E, F>(limit: Duration, call: F) -> Result<T, E>
where
    E: TimedOut,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(E::timed_out(limit)),
    }
}
