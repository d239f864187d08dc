//! Retry with exponential backoff and jitter.
//!
//! [`RetryExecutor`] wraps any async operation returning
//! `Result<T, UpstreamError>`. Each failure is classified and written to the
//! error log before the executor decides whether to sleep and retry, hand
//! the failure to a fallback, or return it to the caller.

mod executor;
mod policy;

pub use executor::RetryExecutor;
pub use policy::RetryPolicy;
