//! Concrete [`Predictor`] implementations.
//!
//! ## 実装
//!
//! - `echo`: 入力をそのまま返す
//! - `sentiment`: 単語辞書による極性判定
//! - `noop`: 常に空文字列を返す

mod echo;
mod noop;
mod sentiment;

use std::{fmt, str::FromStr, sync::Arc};

use serde::Deserialize;

use crate::domain::Predictor;

pub use echo::EchoPredictor;
pub use noop::NoopPredictor;
pub use sentiment::SentimentPredictor;

/// Selector for the predictor implementation, read from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    #[default]
    Echo,
    Sentiment,
    Noop,
}

impl PredictorKind {
    pub const ALL: [PredictorKind; 3] = [Self::Echo, Self::Sentiment, Self::Noop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::Sentiment => "sentiment",
            Self::Noop => "noop",
        }
    }

    /// Instantiate the selected model.
    pub fn build(&self) -> Arc<dyn Predictor> {
        match self {
            Self::Echo => Arc::new(EchoPredictor),
            Self::Sentiment => Arc::new(SentimentPredictor::default()),
            Self::Noop => Arc::new(NoopPredictor),
        }
    }
}

impl fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized predictor name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown predictor '{0}' (expected one of: echo, sentiment, noop)")]
pub struct UnknownPredictor(pub String);

impl FromStr for PredictorKind {
    type Err = UnknownPredictor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPredictor(s.to_string()))
    }
}
