//! The DSP core: STFT frontend plus frame grouper. Together these turn a
//! mono sample buffer into the [`crate::model::Group`] stream the detectors
//! consume.

pub mod grouper;
pub mod stft;

pub use grouper::group_frames;
pub use stft::extract_frequencies;
