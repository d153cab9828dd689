//! Consolidates the frontend's per-frame frequencies into [`Group`]s,
//! per the dynamic-tolerance grouping algorithm in the reference tone
//! detector's `match_frequencies`.

use crate::config::FrontendConfig;
use crate::dsp::stft::Frame;
use crate::model::Group;

/// Group consecutive frames into runs sharing ON/OFF polarity and a stable
/// dominant frequency. OFF runs are emitted explicitly as groups of zeros.
pub fn group_frames(frames: &[Frame], cfg: &FrontendConfig) -> Vec<Group> {
    if frames.is_empty() {
        return Vec::new();
    }

    let step_s = if frames.len() > 1 {
        frames[1].time_s - frames[0].time_s
    } else {
        cfg.time_resolution_ms as f64 / 1000.0
    };

    let mut groups = Vec::new();
    let mut run_start = 0usize;

    let mut i = 1usize;
    while i < frames.len() {
        let prev_off = frames[i - 1].freq_hz <= 0.0;
        let cur_off = frames[i].freq_hz <= 0.0;

        let boundary = if prev_off != cur_off {
            true
        } else if cur_off {
            false
        } else {
            let within_tolerance = within_dynamic_tolerance(
                frames[i - 1].freq_hz,
                frames[i].freq_hz,
                cfg.matching_threshold_pct,
                cfg.abs_cap_hz,
            );
            !within_tolerance
                || force_split(frames, i, cfg.force_split_step_hz, cfg.split_lookahead_frames)
        };

        if boundary {
            groups.push(flush(frames, run_start, i - 1, step_s));
            run_start = i;
        }
        i += 1;
    }
    groups.push(flush(frames, run_start, frames.len() - 1, step_s));

    if cfg.merge_short_gaps_ms > 0 {
        merge_short_gaps(groups, cfg.merge_short_gaps_ms as f64 / 1000.0)
    } else {
        groups
    }
}

fn within_dynamic_tolerance(prev: f64, cur: f64, pct: f64, abs_cap_hz: f64) -> bool {
    let tol = (prev.abs() * pct / 100.0).min(abs_cap_hz);
    (cur - prev).abs() <= tol
}

/// Force a boundary when the step exceeds `force_split_step_hz` and a majority
/// of the next `lookahead` frames confirm the shift (closer to the new value
/// than the old one). A `force_split_step_hz` of 0 disables this entirely.
fn force_split(frames: &[Frame], i: usize, force_split_step_hz: f64, lookahead: usize) -> bool {
    if force_split_step_hz <= 0.0 {
        return false;
    }
    let prev = frames[i - 1].freq_hz;
    let cur = frames[i].freq_hz;
    if (cur - prev).abs() < force_split_step_hz {
        return false;
    }

    let window_end = (i + lookahead).min(frames.len() - 1);
    if window_end <= i {
        return true;
    }
    let lookahead_frames = &frames[i..=window_end];
    let closer_to_new = lookahead_frames
        .iter()
        .filter(|f| (f.freq_hz - cur).abs() < (f.freq_hz - prev).abs())
        .count();
    closer_to_new * 2 >= lookahead_frames.len()
}

fn flush(frames: &[Frame], start_i: usize, end_i: usize, step_s: f64) -> Group {
    let start_s = frames[start_i].time_s;
    let end_s = frames[end_i].time_s + step_s;
    let freqs = frames[start_i..=end_i].iter().map(|f| f.freq_hz).collect();
    Group::new(start_s, end_s, freqs)
}

/// Merge consecutive same-polarity groups separated by at most `gap_s`.
fn merge_short_gaps(groups: Vec<Group>, gap_s: f64) -> Vec<Group> {
    if groups.len() < 2 {
        return groups;
    }
    let mut merged: Vec<Group> = Vec::with_capacity(groups.len());
    let mut iter = groups.into_iter();
    let mut current = iter.next().unwrap();

    for next in iter {
        let same_polarity = current.is_off() == next.is_off();
        let gap = (next.start_s - current.end_s).max(0.0);
        if same_polarity && gap <= gap_s {
            let mut freqs = current.freqs;
            freqs.extend(next.freqs);
            current = Group::new(current.start_s, next.end_s, freqs);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(t: f64, f: f64) -> Frame {
        Frame { time_s: t, freq_hz: f }
    }

    #[test]
    fn splits_on_polarity_change() {
        let cfg = FrontendConfig::default();
        let frames = vec![
            frame(0.0, 1000.0),
            frame(0.05, 1000.0),
            frame(0.10, 0.0),
            frame(0.15, 0.0),
        ];
        let groups = group_frames(&frames, &cfg);
        assert_eq!(groups.len(), 2);
        assert!(!groups[0].is_off());
        assert!(groups[1].is_off());
    }

    #[test]
    fn groups_are_contiguous() {
        let cfg = FrontendConfig::default();
        let frames = vec![frame(0.0, 1000.0), frame(0.05, 1005.0), frame(0.10, 995.0)];
        let groups = group_frames(&frames, &cfg);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].freqs.len(), 3);
    }

    #[test]
    fn large_jump_beyond_tolerance_splits() {
        let cfg = FrontendConfig::default();
        let frames = vec![frame(0.0, 1000.0), frame(0.05, 2000.0)];
        let groups = group_frames(&frames, &cfg);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn empty_frames_yield_no_groups() {
        let cfg = FrontendConfig::default();
        assert!(group_frames(&[], &cfg).is_empty());
    }
}
