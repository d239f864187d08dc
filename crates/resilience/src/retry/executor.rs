//! Async retry executor.

use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};

use super::RetryPolicy;
use crate::diagnostics::{ErrorDetails, ErrorLog};
use crate::errors::{ClassifiedError, ErrorClassifier, UpstreamError};

/// Runs operations under a [`RetryPolicy`].
///
/// Every failed attempt is classified and logged with its attempt index,
/// whatever the eventual outcome. The policy alone decides when to stop: an
/// always-failing operation runs exactly `max_retries + 1` times. The attempt
/// counter is local to each call.
#[derive(Clone)]
pub struct RetryExecutor {
    classifier: Arc<ErrorClassifier>,
    error_log: Arc<ErrorLog>,
}

impl RetryExecutor {
    pub fn new(classifier: Arc<ErrorClassifier>, error_log: Arc<ErrorLog>) -> Self {
        Self {
            classifier,
            error_log,
        }
    }

    pub fn classifier(&self) -> &Arc<ErrorClassifier> {
        &self.classifier
    }

    pub fn error_log(&self) -> &Arc<ErrorLog> {
        &self.error_log
    }

    /// Run `operation` until it succeeds or the policy gives up.
    ///
    /// On give-up the last failure is returned as a [`ClassifiedError`]
    /// wrapping the original [`UpstreamError`] unchanged.
    pub async fn with_retry<T, F, Fut>(
        &self,
        context: &str,
        policy: &RetryPolicy,
        mut operation: F,
    ) -> Result<T, ClassifiedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!("'{}' succeeded after {} retries", context, attempt);
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let classification = self.classifier.classify(&error);
            self.error_log.log_error(
                context,
                &error,
                ErrorDetails::new(classification.kind).with_retry_attempt(attempt),
            );

            if attempt >= policy.max_retries {
                warn!(
                    "'{}' failed after {} attempts, last error {}: {}",
                    context,
                    attempt + 1,
                    classification.kind,
                    error
                );
                return Err(ClassifiedError::new(error, classification));
            }

            let delay = policy.calculate_delay(attempt);
            debug!(
                "'{}' attempt {} failed with {}, retrying in {:?}",
                context, attempt, classification.kind, delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Like [`with_retry`](Self::with_retry), but hands the final failure to
    /// `fallback` instead of returning it.
    ///
    /// The fallback runs at most once. Its own error is returned unmodified.
    pub async fn with_retry_or_fallback<T, E, F, Fut, G, GFut>(
        &self,
        context: &str,
        policy: &RetryPolicy,
        operation: F,
        fallback: G,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
        G: FnOnce(ClassifiedError) -> GFut,
        GFut: Future<Output = Result<T, E>>,
    {
        match self.with_retry(context, policy, operation).await {
            Ok(value) => Ok(value),
            Err(error) => {
                info!(
                    "'{}' exhausted ({}), invoking fallback",
                    context,
                    error.kind()
                );
                fallback(error).await
            }
        }
    }
}
