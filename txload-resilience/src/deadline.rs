//! Optional deadlines for I/O futures

use std::future::Future;
use std::time::Duration;
use tokio::time::error::Elapsed;

/// Run `fut`, bounded by `deadline` when one is configured.
///
/// With `None` the future runs to completion, however long that takes.
pub async fn with_deadline<F>(deadline: Option<Duration>, fut: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut).await,
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses() {
        let result = with_deadline(Some(Duration::from_millis(10)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            7
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_deadline_waits() {
        let result = with_deadline(None, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            7
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }
}
