//! Predictor capability.
//!
//! A predictor turns input text into a derived result and may fail. Concrete
//! models live in `infrastructure::predictor`; callers only see this trait.

use async_trait::async_trait;

use super::error::PredictError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Name of the model, reported alongside its predictions.
    fn name(&self) -> &'static str;

    /// Run the model on `input`.
    ///
    /// May take arbitrarily long; never call it from the hub task.
    async fn predict(&self, input: &str) -> Result<String, PredictError>;
}
