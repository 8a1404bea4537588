// Panic isolation for handler safety
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::error;

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Await `future`, turning a panic inside it into `Err(panic message)`
///
/// Keeps a faulty handler from tearing down the caller (RPC task, UI thread).
///
/// # Example
/// ```text
/// match catch_panic("open_application", handler.run()).await {
///     Ok(result) => result,
///     Err(msg) => OperationResult::failure(msg),
/// }
/// ```
pub async fn catch_panic<F, T>(label: &str, future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(value) => Ok(value),
        Err(panic_info) => {
            let panic_msg = panic_message(panic_info.as_ref());
            error!(label = %label, panic_msg = %panic_msg, "Handler panicked");
            Err(panic_msg)
        }
    }
}
