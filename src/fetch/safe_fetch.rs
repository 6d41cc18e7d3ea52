//! Conversion of fallible fetches into value-carrying results.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::FetchError;

/// The settled outcome of one fetch.
///
/// Either holds a value or an error, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult<T> {
    outcome: Result<T, FetchError>,
}

impl<T> FetchResult<T> {
    /// A fetch that produced a value.
    pub fn ok(value: T) -> Self {
        Self { outcome: Ok(value) }
    }

    /// A fetch that failed.
    pub fn err(error: FetchError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    /// Returns true if the fetch produced a value.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The fetched value, if any.
    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The fetch error, if any.
    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }

    /// Consumes the result into a standard `Result`.
    pub fn into_result(self) -> Result<T, FetchError> {
        self.outcome
    }
}

impl<T> From<Result<T, FetchError>> for FetchResult<T> {
    fn from(outcome: Result<T, FetchError>) -> Self {
        Self { outcome }
    }
}

/// Runs a fetch and settles it into a [`FetchResult`].
///
/// Errors returned by the operation and panics raised while polling it are
/// both captured; nothing propagates to the caller.
///
/// # Example
///
/// ```
/// use payroll_engine::error::FetchError;
/// use payroll_engine::fetch::safe_fetch;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let result = safe_fetch(|| async { Err::<u32, _>(FetchError::Timeout { elapsed_ms: 50 }) }).await;
/// assert!(!result.is_ok());
/// assert_eq!(result.error(), Some(&FetchError::Timeout { elapsed_ms: 50 }));
/// # }
/// ```
pub async fn safe_fetch<T, F, Fut>(operation: F) -> FetchResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    match AssertUnwindSafe(operation()).catch_unwind().await {
        Ok(outcome) => FetchResult::from(outcome),
        Err(payload) => FetchResult::err(FetchError::Panicked {
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_fetch_carries_value() {
        let result = safe_fetch(|| async { Ok::<_, FetchError>(42u32) }).await;

        assert!(result.is_ok());
        assert_eq!(result.value(), Some(&42));
        assert!(result.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_carries_error() {
        let result = safe_fetch(|| async {
            Err::<u32, _>(FetchError::Unavailable {
                message: "db down".to_string(),
            })
        })
        .await;

        assert!(!result.is_ok());
        assert!(result.value().is_none());
        assert_eq!(
            result.error(),
            Some(&FetchError::Unavailable {
                message: "db down".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_panicking_fetch_is_captured() {
        let result: FetchResult<u32> = safe_fetch(|| async {
            if true {
                panic!("lookup exploded");
            }
            Ok(1)
        })
        .await;

        assert_eq!(
            result.into_result(),
            Err(FetchError::Panicked {
                message: "lookup exploded".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_panic_with_formatted_message() {
        let employee_id = 7;
        let result: FetchResult<u32> = safe_fetch(|| async move {
            if employee_id > 0 {
                panic!("bad employee {}", employee_id);
            }
            Ok(1)
        })
        .await;

        assert_eq!(
            result.error(),
            Some(&FetchError::Panicked {
                message: "bad employee 7".to_string()
            })
        );
    }
}
