pub mod artifacts;
pub mod prompts;
pub mod sessions;

use std::future::Future;

use scribe_pipeline::PipelineError;

use crate::error::{AppError, AppResult};

/// Run pipeline work on its own task and wait for it.
///
/// If the client disconnects or the request times out, only this waiter is
/// dropped; generation and the follow-up write still finish.
pub(crate) async fn run_detached<F, T>(work: F) -> AppResult<T>
where
    F: Future<Output = Result<T, PipelineError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(result) => result.map_err(AppError::from),
        Err(join_err) => Err(AppError::InternalError(format!(
            "Pipeline task failed: {join_err}"
        ))),
    }
}
