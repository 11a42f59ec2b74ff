//! Timeouts at external-call boundaries.
//!
//! Embedding models and syntactic parsers are the only potentially slow steps
//! of the pipeline. Both are invoked through [`call_with_timeout`], which runs
//! the call on a background thread and waits on a channel with
//! `recv_timeout`.
//!
//! # Thread Lifecycle
//!
//! If the timeout elapses the result is discarded and the caller receives
//! [`Error::Timeout`]. The background thread runs to completion on its own;
//! Rust threads cannot be killed, so the work is abandoned rather than
//! cancelled.

use crate::{Error, Result};
use std::sync::mpsc;
use std::time::Duration;

/// Runs `call` on a background thread and waits at most `timeout` for it.
///
/// A zero timeout runs the call inline with no deadline.
///
/// # Errors
///
/// Returns [`Error::Timeout`] if the deadline passes, [`Error::Transient`] if the
/// worker thread dies without reporting, or whatever error `call` returns.
pub fn call_with_timeout<T, F>(operation: &'static str, timeout: Duration, call: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    if timeout.is_zero() {
        return call();
    }

    let (tx, rx) = mpsc::channel();
    let parent_span = tracing::Span::current();

    std::thread::Builder::new()
        .name(format!("notegap-{operation}"))
        .spawn(move || {
            let _parent = parent_span.enter();
            // Receiver may be gone after a timeout; nothing to do then.
            let _ = tx.send(call());
        })
        .map_err(|e| Error::transient(operation, e))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            metrics::counter!("notegap_call_timeouts_total", "operation" => operation)
                .increment(1);
            tracing::warn!(
                operation = operation,
                timeout_ms = timeout_ms,
                "External call timed out, abandoning worker thread"
            );
            Err(Error::Timeout {
                operation: operation.to_string(),
                timeout_ms,
            })
        },
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::transient(
            operation,
            "worker thread exited without a result",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_completes_within_timeout() {
        let result = call_with_timeout("quick", Duration::from_secs(5), || Ok(42));
        assert_eq!(result.ok(), Some(42));
    }

    #[test]
    fn test_call_times_out() {
        let result: Result<()> = call_with_timeout("slow", Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(500));
            Ok(())
        });
        match result {
            Err(Error::Timeout {
                operation,
                timeout_ms,
            }) => {
                assert_eq!(operation, "slow");
                assert_eq!(timeout_ms, 20);
            },
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_call_error_is_propagated() {
        let result: Result<()> = call_with_timeout("failing", Duration::from_secs(5), || {
            Err(Error::transient("failing", "boom"))
        });
        assert!(matches!(result, Err(Error::Transient { .. })));
    }

    #[test]
    fn test_zero_timeout_runs_inline() {
        let result = call_with_timeout("inline", Duration::ZERO, || Ok("done"));
        assert_eq!(result.ok(), Some("done"));
    }

    #[test]
    fn test_worker_panic_is_transient() {
        let result: Result<()> =
            call_with_timeout("panicky", Duration::from_secs(5), || panic!("worker died"));
        assert!(matches!(result, Err(Error::Transient { .. })));
    }
}
