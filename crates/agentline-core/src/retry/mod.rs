//! Retry logic for outbound agent calls
//!
//! Fixed-delay retry with a small bounded attempt count. Used by the agent
//! client for inter-agent calls; the primary client path runs a single attempt.

mod backoff;

pub use backoff::{is_retryable_status, with_retry, IsRetryable, RetryConfig};
