//! Two-tone "Quick Call" detector (§4.4): short tone A immediately followed
//! by a longer, distinct tone B.

use crate::config::TwoToneConfig;
use crate::detect::common::{separated_enough, stable_nonzero};
use crate::model::{Group, TwoToneHit};

pub fn detect(groups: &[Group], cfg: &TwoToneConfig) -> Vec<TwoToneHit> {
    let mut hits = Vec::new();
    let mut candidate: Option<&Group> = None;

    for g in groups {
        if !stable_nonzero(g, cfg.tone_bw_hz) {
            continue;
        }

        let Some(a) = candidate else {
            candidate = qualifies_as_a(g, cfg.tone_a_min_length_s);
            continue;
        };

        let fa = a.center();
        let fb = g.center();
        let gap = (g.start_s - a.end_s).max(0.0);

        if a.duration_s >= cfg.tone_a_min_length_s
            && g.duration_s >= cfg.tone_b_min_length_s
            && gap <= cfg.max_gap_between_a_b_s
            && separated_enough(fa, fb, cfg.min_pair_separation_hz)
        {
            hits.push(TwoToneHit {
                tone_id: format!("qc_{}", hits.len() + 1),
                detected: [fa, fb],
                tone_a_length: a.duration_s,
                tone_b_length: g.duration_s,
                start: a.start_s,
                end: g.end_s,
            });
            candidate = None;
        } else {
            candidate = qualifies_as_a(g, cfg.tone_a_min_length_s);
        }
    }

    hits
}

fn qualifies_as_a(g: &Group, min_len_s: f64) -> Option<&Group> {
    (g.duration_s >= min_len_s).then_some(g)
}
