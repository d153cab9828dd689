//! Audio ingestion: turning an arbitrary input into the mono sample sequence
//! the core engine consumes. Out of the core's contract (see SPEC_FULL.md
//! §4.8) but needed for the shipped binary to run against real files.

mod loader;
mod source;

pub use loader::{load, AudioLoadError};
pub use source::AudioSource;

/// A decoded, mono, `f32`-in-`[-1,1]` audio clip plus the metadata the core
/// engine needs: its sample rate and duration.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub duration_seconds: f64,
}

impl AudioClip {
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration_seconds = samples.len() as f64 / sample_rate.max(1) as f64;
        Self {
            samples,
            sample_rate,
            duration_seconds,
        }
    }
}
