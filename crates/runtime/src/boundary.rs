//! Fault containment.
//!
//! [`contain`] runs a fallible future and folds any failure, an `Err` or a
//! panic, into the caller's result type. It is applied at tool execution and
//! at [`Agent::run`](crate::Agent::run).

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

/// Await `fut`; on `Err` or panic, build the result with `recover(message)`.
pub async fn contain<T, E, F>(fut: F, recover: impl FnOnce(String) -> T) -> T
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => value,
        Ok(Err(error)) => recover(error.to_string()),
        Err(payload) => recover(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_success_through() {
        let out = contain(async { Ok::<_, String>(7) }, |_| 0).await;
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn folds_errors() {
        let out = contain(async { Err::<i32, _>("bad input") }, |m| {
            assert_eq!(m, "bad input");
            -1
        })
        .await;
        assert_eq!(out, -1);
    }

    #[tokio::test]
    async fn folds_panics() {
        let out = contain(
            async {
                if true {
                    panic!("exploded");
                }
                Ok::<String, String>("unreachable".into())
            },
            |m| m,
        )
        .await;
        assert_eq!(out, "panicked: exploded");
    }
}
