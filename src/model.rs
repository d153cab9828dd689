//! Shared data types passed between the frontend, grouper, detectors, and cascade.

use serde::{Deserialize, Serialize};

/// A contiguous run of STFT frames sharing ON/OFF polarity and (if ON) a stable
/// dominant frequency.
///
/// A single explicit struct rather than a positional tuple, so frequency-list
/// position can never drift out of sync with the rest of the fields across edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub start_s: f64,
    pub end_s: f64,
    pub duration_s: f64,
    pub freqs: Vec<f64>,
}

impl Group {
    pub fn new(start_s: f64, end_s: f64, freqs: Vec<f64>) -> Self {
        Self {
            start_s,
            end_s,
            duration_s: end_s - start_s,
            freqs,
        }
    }

    /// True if this group represents silence (all frames detected as OFF).
    pub fn is_off(&self) -> bool {
        self.freqs.iter().all(|&f| f <= 0.0)
    }

    /// Nonzero frequencies recorded in this group.
    pub fn nonzero_freqs(&self) -> Vec<f64> {
        self.freqs.iter().copied().filter(|&f| f > 0.0).collect()
    }

    /// Robust representative frequency: the median of the nonzero samples, or
    /// 0.0 if the group is OFF or has no nonzero samples.
    pub fn center(&self) -> f64 {
        median(&self.nonzero_freqs())
    }

    /// A group is "stable" when every nonzero frame lies within `bw_hz` of the
    /// group's center. Off groups, and groups with fewer than two nonzero
    /// samples, are never considered stable.
    pub fn is_stable(&self, bw_hz: f64) -> bool {
        let nz = self.nonzero_freqs();
        if nz.len() < 2 {
            return false;
        }
        let med = median(&nz);
        nz.iter().all(|&f| (f - med).abs() <= bw_hz)
    }
}

/// Median of a slice of `f64`. Returns 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// A pulsed single-tone hit: an inferred carrier alternating ON/OFF at a
/// roughly constant cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulsedHit {
    pub tone_id: String,
    pub detected: f64,
    pub start: f64,
    pub end: f64,
    pub length: f64,
    pub cycles: u32,
    pub on_ms_median: i64,
    pub off_ms_median: i64,
}

/// A two-tone ("Quick Call") hit: short tone A immediately followed by a
/// longer, distinct tone B.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoToneHit {
    pub tone_id: String,
    pub detected: [f64; 2],
    pub tone_a_length: f64,
    pub tone_b_length: f64,
    pub start: f64,
    pub end: f64,
}

/// A long single-tone hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongToneHit {
    pub tone_id: String,
    pub detected: f64,
    pub start: f64,
    pub end: f64,
    pub length: f64,
}

/// A hi-low warble hit: an alternating run between exactly two stable tones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarbleHit {
    pub tone_id: String,
    pub detected: [f64; 2],
    pub start: f64,
    pub end: f64,
    pub length: f64,
    pub alternations: u32,
}

/// The result of a single `analyze()` call: six ordered lists, one per
/// detector kind, plus the two external-decoder passthrough lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub pulsed: Vec<PulsedHit>,
    pub two_tone: Vec<TwoToneHit>,
    pub long: Vec<LongToneHit>,
    pub hi_low: Vec<WarbleHit>,
    pub mdc: Vec<serde_json::Value>,
    pub dtmf: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd() {
        assert_eq!(median(&[1.0, 3.0, 2.0]), 2.0);
    }

    #[test]
    fn median_even() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn median_empty() {
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn group_center_and_stability() {
        let g = Group::new(0.0, 1.0, vec![1000.0, 1005.0, 995.0]);
        assert!((g.center() - 1000.0).abs() < 1e-9);
        assert!(g.is_stable(25.0));
        assert!(!g.is_stable(2.0));
    }

    #[test]
    fn off_group() {
        let g = Group::new(0.0, 1.0, vec![0.0, 0.0]);
        assert!(g.is_off());
        assert_eq!(g.center(), 0.0);
        assert!(!g.is_stable(25.0));
    }
}
