use async_trait::async_trait;

use crate::domain::{PredictError, Predictor};

/// Always succeeds with an empty result.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPredictor;

#[async_trait]
impl Predictor for NoopPredictor {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn predict(&self, _input: &str) -> Result<String, PredictError> {
        Ok(String::new())
    }
}
