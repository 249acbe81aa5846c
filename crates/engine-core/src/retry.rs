use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, warn};

/// Indicates whether an error should be retried or treated as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Result of running an operation under the retry policy.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The error was considered fatal and should bubble up immediately.
    #[error("{0}")]
    Fatal(E),
    /// The error was retryable, but the configured attempts were exhausted.
    #[error("giving up after {attempts} attempt(s): {last_error}")]
    AttemptsExceeded { attempts: usize, last_error: E },
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Fatal(err) => err,
            RetryError::AttemptsExceeded { last_error, .. } => last_error,
        }
    }
}

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Preset for waiting on a database that may still be starting up.
    pub fn for_database() -> Self {
        Self::new(5, Duration::from_secs(2))
    }

    /// A single attempt, no retries.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Executes the operation with the configured retry policy.
    pub async fn run<F, Fut, T, E, Classifier>(
        &self,
        mut op: F,
        classify: Classifier,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Classifier: Fn(&E) -> RetryDisposition,
        E: Display,
    {
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(result) => return Ok(result),
                Err(err) => match classify(&err) {
                    RetryDisposition::Stop => return Err(RetryError::Fatal(err)),
                    RetryDisposition::Retry => {
                        if attempt >= self.max_attempts {
                            error!(
                                "Attempt {attempt}/{} failed: {err}; no attempts left",
                                self.max_attempts
                            );
                            return Err(RetryError::AttemptsExceeded {
                                attempts: attempt,
                                last_error: err,
                            });
                        }

                        warn!(
                            "Attempt {attempt}/{} failed: {err}; retrying in {:?}",
                            self.max_attempts, self.delay
                        );
                        sleep(self.delay).await;
                        attempt += 1;
                    }
                },
            }
        }
    }
}
