//! Utilities shared by the tidings crates: logging setup and clocks.

pub mod logger;
pub mod time;
