//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap outbound calls (health probes, forwarded requests) with a deadline
//! - Allow an explicitly unbounded call when no deadline is configured
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from transport errors
//! - Timed-out forwards return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, error::Elapsed};

/// Run `fut` under `deadline`, or unbounded when `deadline` is `None`.
pub async fn with_deadline<F>(deadline: Option<Duration>, fut: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    match deadline {
        Some(limit) => time::timeout(limit, fut).await,
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses() {
        let slow = time::sleep(Duration::from_secs(10));
        assert!(with_deadline(Some(Duration::from_secs(1)), slow).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_deadline_waits() {
        let slow = async {
            time::sleep(Duration::from_secs(10)).await;
            7
        };
        assert_eq!(with_deadline(None, slow).await.unwrap(), 7);
    }
}
