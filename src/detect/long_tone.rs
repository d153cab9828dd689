//! Long single-tone detector (§4.5): reports stable groups exceeding a
//! minimum duration and above a minimum frequency floor.

use crate::config::LongToneConfig;
use crate::detect::common::stable_nonzero;
use crate::model::{Group, LongToneHit};

pub fn detect(groups: &[Group], cfg: &LongToneConfig, min_freq_hz: f64) -> Vec<LongToneHit> {
    let mut hits = Vec::new();

    for g in groups {
        if !stable_nonzero(g, cfg.tone_bw_hz) {
            continue;
        }
        let center = g.center();
        if center <= min_freq_hz {
            continue;
        }
        if g.duration_s >= cfg.min_duration_s {
            hits.push(LongToneHit {
                tone_id: format!("lt_{}", hits.len() + 1),
                detected: center,
                start: g.start_s,
                end: g.end_s,
                length: g.duration_s,
            });
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_stable_long_group() {
        let cfg = LongToneConfig::default();
        let groups = vec![Group::new(0.0, 4.0, vec![1200.0; 80])];
        let hits = detect(&groups, &cfg, 200.0);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].detected - 1200.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_short_group() {
        let cfg = LongToneConfig::default();
        let groups = vec![Group::new(0.0, 1.0, vec![1200.0; 20])];
        assert!(detect(&groups, &cfg, 200.0).is_empty());
    }

    #[test]
    fn rejects_unstable_group() {
        let cfg = LongToneConfig::default();
        let mut freqs = vec![1200.0; 80];
        freqs[40] = 1400.0;
        let groups = vec![Group::new(0.0, 4.0, freqs)];
        assert!(detect(&groups, &cfg, 200.0).is_empty());
    }

    #[test]
    fn rejects_below_min_freq() {
        let cfg = LongToneConfig::default();
        let groups = vec![Group::new(0.0, 4.0, vec![150.0; 80])];
        assert!(detect(&groups, &cfg, 200.0).is_empty());
    }
}
