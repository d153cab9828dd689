//! Hi-low warble detector (§4.6): runs of alternation between exactly two
//! distinct, stable tones.

use crate::config::WarbleConfig;
use crate::detect::common::separated_enough;
use crate::model::{median, Group, WarbleHit};

pub fn detect(groups: &[Group], cfg: &WarbleConfig) -> Vec<WarbleHit> {
    let mut hits = Vec::new();
    let mut i = 0usize;

    while i < groups.len() {
        let (run, next_i) = scan_run(groups, i, cfg);
        i = next_i;

        if run.len() as u32 >= cfg.min_alternations {
            if let Some(hit) = finalize_run(&run, hits.len() + 1) {
                hits.push(hit);
            }
        }
    }

    hits
}

/// Scan forward from `start` for one maximal alternating run. Returns the run
/// (as group references) and the index to resume scanning from.
fn scan_run<'a>(groups: &'a [Group], start: usize, cfg: &WarbleConfig) -> (Vec<&'a Group>, usize) {
    let mut run: Vec<&Group> = Vec::new();
    let mut allowed_tones: Vec<f64> = Vec::new();
    let mut i = start;

    while i < groups.len() {
        let g = &groups[i];
        i += 1;

        if g.is_off() || g.nonzero_freqs().len() < 2 || !g.is_stable(cfg.tone_bw_hz) {
            break;
        }
        let f = g.center();

        if run.is_empty() {
            run.push(g);
            allowed_tones.push(f);
            continue;
        }

        let last = run[run.len() - 1];
        let gap_ok = (g.start_s - last.end_s) <= (cfg.interval_length_s + 1e-6);
        if !gap_ok {
            break;
        }

        let f_last = last.center();
        if (f - f_last).abs() <= cfg.tone_bw_hz {
            break;
        }

        if allowed_tones.len() < 2 {
            if separated_enough(allowed_tones[0], f, cfg.min_pair_separation_hz) {
                allowed_tones.push(f);
            } else {
                break;
            }
        } else if !allowed_tones.iter().any(|&ct| (f - ct).abs() <= cfg.tone_bw_hz) {
            break;
        }

        run.push(g);
    }

    // Every loop iteration consumes its group (via `i += 1` up front) before
    // any break, mirroring the reference scanner's `g = frequency_matches[i];
    // i += 1` — so whichever check disqualified the group, the next run
    // starts past it rather than re-examining it.
    (run, i)
}

fn finalize_run(run: &[&Group], ordinal: usize) -> Option<WarbleHit> {
    if run.len() < 2 {
        return None;
    }
    let a = run[0].center();
    let b = run.iter().map(|g| g.center()).find(|&f| (f - a).abs() > 1e-9)?;

    let mut lows = Vec::new();
    let mut highs = Vec::new();
    for g in run {
        let fc = g.center();
        if (fc - a).abs() < (fc - b).abs() {
            lows.push(fc);
        } else {
            highs.push(fc);
        }
    }

    let low = if lows.is_empty() { a } else { median(&lows) };
    let high = if highs.is_empty() { b } else { median(&highs) };
    let (low, high) = if low <= high { (low, high) } else { (high, low) };

    Some(WarbleHit {
        tone_id: format!("hl_{ordinal}"),
        detected: [low, high],
        start: run[0].start_s,
        end: run[run.len() - 1].end_s,
        length: run[run.len() - 1].end_s - run[0].start_s,
        alternations: run.len() as u32,
    })
}
