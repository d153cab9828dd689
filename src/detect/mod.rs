//! The four pattern detectors. Each consumes the [`crate::model::Group`]
//! stream the cascade hands it and is otherwise independent of the others —
//! sequencing and inter-stage masking live in [`crate::cascade`].

pub mod common;
pub mod long_tone;
pub mod pulsed;
pub mod two_tone;
pub mod warble;
