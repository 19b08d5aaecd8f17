//! Infrastructure layer: concrete predictors and wire DTOs.

pub mod dto;
pub mod predictor;
