//! Orchestrates the four detectors in fixed order (Pulsed → Two-Tone → Long
//! → Warble), masking out groups overlapping each stage's hits before the
//! next stage runs. See §4.7.

use crate::config::EngineConfig;
use crate::detect::{long_tone, pulsed, two_tone, warble};
use crate::model::{Group, LongToneHit, PulsedHit, TwoToneHit, WarbleHit};

/// Half a hop, in seconds, used as the overlap guard between cascade stages.
fn guard_seconds(cfg: &EngineConfig) -> f64 {
    (cfg.frontend.time_resolution_ms as f64 / 1000.0) / 2.0
}

pub struct CascadeResult {
    pub pulsed: Vec<PulsedHit>,
    pub two_tone: Vec<TwoToneHit>,
    pub long: Vec<LongToneHit>,
    pub hi_low: Vec<WarbleHit>,
}

pub fn run(groups: &[Group], cfg: &EngineConfig) -> CascadeResult {
    let guard = guard_seconds(cfg);

    let pulsed_hits = if cfg.detectors.pulsed {
        pulsed::detect(groups, &cfg.pulsed)
    } else {
        Vec::new()
    };
    let pulsed_windows: Vec<(f64, f64)> = pulsed_hits.iter().map(|h| (h.start, h.end)).collect();
    let after_pulsed = filter_groups_outside(groups, &pulsed_windows, guard);

    let two_tone_hits = if cfg.detectors.two_tone {
        two_tone::detect(&after_pulsed, &cfg.two_tone)
    } else {
        Vec::new()
    };
    let qc_windows = qc_windows_from_hits(&two_tone_hits, cfg.two_tone.mask_quick_call_a);
    let after_two_tone = filter_groups_outside(&after_pulsed, &qc_windows, guard);

    let long_hits = if cfg.detectors.long_tone {
        long_tone::detect(&after_two_tone, &cfg.long_tone, cfg.effective_long_tone_min_freq_hz())
    } else {
        Vec::new()
    };
    let long_windows: Vec<(f64, f64)> = long_hits.iter().map(|h| (h.start, h.end)).collect();
    let after_long = filter_groups_outside(&after_two_tone, &long_windows, guard);

    let hi_low_hits = if cfg.detectors.hi_low {
        warble::detect(&after_long, &cfg.warble)
    } else {
        Vec::new()
    };

    CascadeResult {
        pulsed: pulsed_hits,
        two_tone: two_tone_hits,
        long: long_hits,
        hi_low: hi_low_hits,
    }
}

/// Two intervals overlap iff NOT (e1 + guard <= s2 OR e2 + guard <= s1).
fn overlaps(a: (f64, f64), b: (f64, f64), guard: f64) -> bool {
    let (s1, e1) = a;
    let (s2, e2) = b;
    !(e1 + guard <= s2 || e2 + guard <= s1)
}

fn filter_groups_outside(groups: &[Group], windows: &[(f64, f64)], guard: f64) -> Vec<Group> {
    if windows.is_empty() {
        return groups.to_vec();
    }
    groups
        .iter()
        .filter(|g| !windows.iter().any(|&w| overlaps((g.start_s, g.end_s), w, guard)))
        .cloned()
        .collect()
}

/// Build masking windows for Quick Call hits: always the B-tone portion
/// (end - tone_b_length .. end); additionally the A-tone portion when
/// `mask_a` is set. The overlap guard is applied uniformly by
/// `filter_groups_outside`, so these windows are left unpadded.
fn qc_windows_from_hits(hits: &[TwoToneHit], mask_a: bool) -> Vec<(f64, f64)> {
    let mut wins = Vec::new();
    for h in hits {
        let a_win = (h.start, h.start + h.tone_a_length);
        let b_win = (h.end - h.tone_b_length, h.end);
        if mask_a {
            wins.push(a_win);
        }
        wins.push(b_win);
    }
    wins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulsed_windows_mask_overlapping_groups_from_later_stages() {
        let mut cfg = EngineConfig::default();
        cfg.detectors.two_tone = false;
        cfg.detectors.long_tone = false;
        cfg.detectors.hi_low = false;

        // 8 repetitions of (0.3s ON @ 1000Hz, 0.1s OFF)
        let mut groups = Vec::new();
        let mut t = 0.0;
        for _ in 0..8 {
            groups.push(Group::new(t, t + 0.3, vec![1000.0; 6]));
            t += 0.3;
            groups.push(Group::new(t, t + 0.1, vec![0.0; 2]));
            t += 0.1;
        }

        let result = run(&groups, &cfg);
        assert_eq!(result.pulsed.len(), 1);
        assert!(result.long.is_empty());
        assert!(result.hi_low.is_empty());
    }

    #[test]
    fn non_overlapping_mixed_hits_stay_distinct() {
        let cfg = EngineConfig::default();

        let mut groups = Vec::new();
        groups.push(Group::new(0.0, 0.9, vec![700.0; 18]));
        groups.push(Group::new(0.9, 3.6, vec![1400.0; 54]));
        groups.push(Group::new(3.6, 4.1, vec![0.0; 10]));
        groups.push(Group::new(4.1, 9.1, vec![2000.0; 100]));

        let result = run(&groups, &cfg);
        assert_eq!(result.two_tone.len(), 1);
        assert_eq!(result.long.len(), 1);

        let qc = &result.two_tone[0];
        let lt = &result.long[0];
        assert!(qc.end <= lt.start || lt.end <= qc.start);
    }
}
