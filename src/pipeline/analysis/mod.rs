pub mod types;
pub mod calibration;
pub mod intake;
pub mod sampler;
pub mod matcher;
pub mod classify;
pub mod reference;
pub mod summary;
pub mod orchestrator;

pub use types::*;
pub use calibration::*;
pub use intake::*;
pub use sampler::*;
pub use matcher::*;
pub use classify::*;
pub use reference::*;
pub use summary::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Image too small for analysis: {width}x{height} region (minimum {min}x{min})")]
    RegionTooSmall { width: u32, height: u32, min: u32 },

    #[error("Image too large: {width}x{height} (maximum {max}x{max})")]
    ImageTooLarge { width: u32, height: u32, max: u32 },

    #[error("No valid pixels found in analysis region")]
    NoValidPixels,

    #[error("Empty calibration table")]
    EmptyCalibration,

    #[error("Unsupported cholesterol level: {0}")]
    UnsupportedLevel(u32),
}

impl AnalysisError {
    /// Errors that mean the sampled region carried no usable signal, as
    /// opposed to a malformed or undersized input.
    pub fn is_no_signal(&self) -> bool {
        matches!(self, Self::NoValidPixels)
    }
}
