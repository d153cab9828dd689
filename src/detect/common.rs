//! Helpers shared by the four pattern detectors.

use crate::model::Group;

/// True if `g` carries signal (at least one nonzero frame) and all of its
/// nonzero frames fall within `bw_hz` of the group's median — the stability
/// test every detector but Pulsed gates its input groups on.
pub fn stable_nonzero(g: &Group, bw_hz: f64) -> bool {
    !g.is_off() && g.is_stable(bw_hz)
}

/// Two tones are "meaningfully distinct" rather than drift of the same tone.
pub fn separated_enough(f1: f64, f2: f64, min_separation_hz: f64) -> bool {
    f1 > 0.0 && f2 > 0.0 && (f1 - f2).abs() >= min_separation_hz
}
