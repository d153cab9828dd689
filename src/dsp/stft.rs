//! Short-Time Fourier Transform frontend: turns a mono sample buffer into a
//! sequence of per-frame dominant frequencies, gated for silence and SNR.
//!
//! The FFT plumbing (planner, Hann window, complex buffer reuse) follows the
//! same `rustfft` idiom this codebase already used for its real-time
//! dominant-frequency estimate; the gating and sub-bin refinement match the
//! reference tone detector this module is a faithful port of.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::config::FrontendConfig;
use crate::error::EngineError;

/// One STFT frame: center time in seconds, and the detected dominant
/// frequency in Hz (0.0 denotes OFF/gated).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub time_s: f64,
    pub freq_hz: f64,
}

/// Run the STFT frontend over `samples` at `sample_rate`, per `cfg`.
///
/// Returns an empty sequence for empty input or input with no signal above
/// the noise floor (see §4.1 step 3).
pub fn extract_frequencies(
    samples: &[f32],
    sample_rate: u32,
    cfg: &FrontendConfig,
) -> Result<Vec<Frame>, EngineError> {
    if samples.is_empty() || sample_rate == 0 {
        return Ok(Vec::new());
    }

    let hop = (sample_rate as f64 * cfg.time_resolution_ms as f64 / 1000.0)
        .round()
        .max(1.0) as usize;
    let n_fft = pick_nfft(hop);

    if samples.len() < n_fft {
        return Ok(Vec::new());
    }

    let window = hann_window(n_fft);
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

    let step_s = hop as f64 / sample_rate as f64;
    let bin_hz = sample_rate as f64 / n_fft as f64;

    let (lo_hz, hi_hz) = cfg.freq_band_hz;
    let lo_bin = ((lo_hz / bin_hz).floor() as usize).min(n_fft / 2);
    let hi_bin = ((hi_hz / bin_hz).ceil() as usize).min(n_fft / 2);
    let (lo_bin, hi_bin) = if lo_bin < hi_bin {
        (lo_bin, hi_bin)
    } else {
        (0, n_fft / 2)
    };

    // No padding at the boundaries: the last complete window starting position is
    // samples.len() - n_fft, stepped by `hop`.
    let mut buf = vec![Complex::new(0.0f32, 0.0f32); n_fft];
    let mut frame_peaks: Vec<f32> = Vec::new();
    let mut frame_spectra: Vec<Vec<f32>> = Vec::new();
    let mut frame_times: Vec<f64> = Vec::new();

    let mut start = 0usize;
    let mut frame_index = 0usize;
    while start + n_fft <= samples.len() {
        for i in 0..n_fft {
            buf[i] = Complex::new(samples[start + i] * window[i], 0.0);
        }
        fft.process_with_scratch(&mut buf, &mut scratch);

        let band_mags: Vec<f32> = (lo_bin..=hi_bin).map(|k| buf[k].norm()).collect();
        let peak = band_mags.iter().cloned().fold(0.0f32, f32::max);

        frame_peaks.push(peak.max(1e-20));
        frame_spectra.push(band_mags);
        frame_times.push(frame_index as f64 * step_s);

        frame_index += 1;
        start += hop;
    }

    if frame_peaks.is_empty() {
        return Ok(Vec::new());
    }

    let global_peak = frame_peaks.iter().cloned().fold(0.0f32, f32::max);
    if global_peak <= 1e-20 {
        return Ok(Vec::new());
    }

    let rel_db: Vec<f64> = frame_peaks
        .iter()
        .map(|&p| 20.0 * ((p as f64 / global_peak as f64) + 1e-20).log10())
        .collect();

    let noise_floor_db = estimate_noise_floor(&rel_db);

    let mut out = Vec::with_capacity(frame_spectra.len());
    for (i, band_mags) in frame_spectra.iter().enumerate() {
        let is_silent = rel_db[i] < cfg.silence_below_global_db
            || rel_db[i] < noise_floor_db + cfg.snr_above_noise_db;

        let freq_hz = if is_silent {
            0.0
        } else {
            refine_peak(band_mags, lo_bin, bin_hz)
        };

        out.push(Frame {
            time_s: frame_times[i],
            freq_hz,
        });
    }

    Ok(out)
}

/// Pick an FFT length: a power of two near `2 * hop`, clamped to [256, 4096].
fn pick_nfft(hop: usize) -> usize {
    let target = (2 * hop).clamp(256, 4096) as f64;
    let pow = target.log2().round();
    (2f64.powf(pow)) as usize
}

fn hann_window(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (n - 1) as f32).cos()))
        .collect()
}

/// Median of the rel_db values falling in the lowest 20% quantile.
fn estimate_noise_floor(rel_db: &[f64]) -> f64 {
    let mut sorted = rel_db.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let q20_idx = ((sorted.len() as f64 - 1.0) * 0.20).round() as usize;
    let q20 = sorted[q20_idx.min(sorted.len() - 1)];

    let below: Vec<f64> = rel_db.iter().cloned().filter(|&v| v <= q20).collect();
    if below.is_empty() {
        return -60.0;
    }
    crate::model::median(&below)
}

/// Parabolic interpolation around the band's peak bin, `lo_bin` offset baked in.
fn refine_peak(band_mags: &[f32], lo_bin: usize, bin_hz: f64) -> f64 {
    let (k, _) = band_mags
        .iter()
        .enumerate()
        .fold((0usize, f32::MIN), |acc, (i, &m)| if m > acc.1 { (i, m) } else { acc });

    let last = band_mags.len() - 1;
    let km = k.saturating_sub(1);
    let kp = (k + 1).min(last);

    let (ym, y0, yp) = (band_mags[km] as f64, band_mags[k] as f64, band_mags[kp] as f64);
    let denom = ym - 2.0 * y0 + yp;
    let delta = if denom == 0.0 || k == 0 || k == last {
        0.0
    } else {
        (0.5 * (ym - yp) / denom).clamp(-0.5, 0.5)
    };

    (lo_bin + k) as f64 * bin_hz + delta * bin_hz
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: u32, duration_s: f64, amplitude: f32) -> Vec<f32> {
        let n = (duration_s * sample_rate as f64) as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (amplitude as f64 * (2.0 * std::f64::consts::PI * freq * t).sin()) as f32
            })
            .collect()
    }

    #[test]
    fn silence_yields_no_frames() {
        let cfg = FrontendConfig::default();
        let samples = vec![0.0f32; 16_000 * 2];
        let frames = extract_frequencies(&samples, 16_000, &cfg).unwrap();
        assert!(frames.iter().all(|f| f.freq_hz == 0.0));
    }

    #[test]
    fn empty_input_yields_empty_sequence() {
        let cfg = FrontendConfig::default();
        let frames = extract_frequencies(&[], 16_000, &cfg).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn detects_tone_near_expected_frequency() {
        let cfg = FrontendConfig::default();
        let samples = sine(1200.0, 16_000, 1.0, 0.5);
        let frames = extract_frequencies(&samples, 16_000, &cfg).unwrap();
        let on_frames: Vec<&Frame> = frames.iter().filter(|f| f.freq_hz > 0.0).collect();
        assert!(!on_frames.is_empty());
        for f in on_frames {
            assert!((f.freq_hz - 1200.0).abs() < 30.0, "got {}", f.freq_hz);
        }
    }
}
