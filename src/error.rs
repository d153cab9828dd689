//! Error kinds surfaced by the tone detection engine.

use thiserror::Error;

/// Top-level error returned by [`crate::analyze`].
#[derive(Error, Debug)]
pub enum EngineError {
    /// The input could not be fetched, decoded, or read as audio.
    #[error("failed to load audio: {0}")]
    AudioLoad(String),

    /// STFT or frame grouping failed internally.
    #[error("frequency extraction failed: {0}")]
    FrequencyExtraction(String),

    /// An external decoder (MDC1200/FleetSync or DTMF) failed or returned nonzero.
    #[error("tone detection failed: {0}")]
    ToneDetection(String),

    /// A required external program is not available on `PATH`.
    #[error("external tool missing: {0}")]
    ExternalToolMissing(String),

    /// A configuration parameter violates its documented bounds.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
}
