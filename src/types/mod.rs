use thiserror::Error;

mod ids;

pub use ids::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid player ID: {0}")]
    InvalidId(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid request header '{header}': {reason}")]
    InvalidHeader { header: String, reason: String },

    #[error("Value out of bounds: {value}, expected {min}..={max}")]
    OutOfBounds { value: u64, min: u64, max: u64 },
}
