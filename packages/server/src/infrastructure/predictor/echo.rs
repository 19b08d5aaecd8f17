use async_trait::async_trait;

use crate::domain::{PredictError, Predictor};

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoPredictor;

#[async_trait]
impl Predictor for EchoPredictor {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn predict(&self, input: &str) -> Result<String, PredictError> {
        Ok(input.to_string())
    }
}
