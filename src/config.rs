//! Configuration for the tone detection engine.
//!
//! Mirrors the nested-struct-with-`Default`-impls shape used throughout this
//! codebase's other configuration surfaces, plus the same TOML load/save
//! round-trip so a tuned parameter set can be saved once and reused across
//! invocations instead of retyping two dozen flags.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::error::EngineError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub frontend: FrontendConfig,
    pub two_tone: TwoToneConfig,
    pub long_tone: LongToneConfig,
    pub warble: WarbleConfig,
    pub pulsed: PulsedConfig,
    pub decoders: DecoderConfig,
    pub detectors: DetectorToggles,
    /// When true, dump a verbose per-group trace during analysis.
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frontend: FrontendConfig::default(),
            two_tone: TwoToneConfig::default(),
            long_tone: LongToneConfig::default(),
            warble: WarbleConfig::default(),
            pulsed: PulsedConfig::default(),
            decoders: DecoderConfig::default(),
            detectors: DetectorToggles::default(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Dynamic grouping tolerance, as a percentage of the previous frame's frequency.
    pub matching_threshold_pct: f64,
    /// STFT hop size in milliseconds.
    pub time_resolution_ms: u32,
    /// [Hz] Band searched for the dominant spectral peak.
    pub freq_band_hz: (f64, f64),
    /// A frame is OFF if its peak is this many dB below the clip's global peak.
    pub silence_below_global_db: f64,
    /// A frame must additionally be this many dB above the noise floor to count as ON.
    pub snr_above_noise_db: f64,
    /// Merge adjacent same-polarity groups separated by at most this gap (ms). 0 disables.
    pub merge_short_gaps_ms: u32,
    /// Absolute ceiling (Hz) on the percent-based grouping tolerance.
    pub abs_cap_hz: f64,
    /// Force a group boundary when the step between adjacent frames exceeds this (Hz). 0 disables.
    pub force_split_step_hz: f64,
    /// Look-ahead frames used to confirm a forced split.
    pub split_lookahead_frames: usize,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            matching_threshold_pct: 2.5,
            time_resolution_ms: 50,
            freq_band_hz: (200.0, 3000.0),
            silence_below_global_db: -28.0,
            snr_above_noise_db: 6.0,
            merge_short_gaps_ms: 0,
            abs_cap_hz: 15.0,
            force_split_step_hz: 0.0,
            split_lookahead_frames: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoToneConfig {
    pub tone_a_min_length_s: f64,
    pub tone_b_min_length_s: f64,
    pub max_gap_between_a_b_s: f64,
    pub tone_bw_hz: f64,
    pub min_pair_separation_hz: f64,
    /// Also mask tone A's window before long-tone detection (default off — only B is masked).
    pub mask_quick_call_a: bool,
}

impl Default for TwoToneConfig {
    fn default() -> Self {
        Self {
            tone_a_min_length_s: 0.85,
            tone_b_min_length_s: 2.6,
            max_gap_between_a_b_s: 0.35,
            tone_bw_hz: 25.0,
            min_pair_separation_hz: 40.0,
            mask_quick_call_a: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LongToneConfig {
    pub min_duration_s: f64,
    pub tone_bw_hz: f64,
    /// Minimum center frequency (Hz) to exclude DC/sub-band artifacts.
    /// Defaults to the frontend's lower search bound when left at 0.0.
    pub min_freq_hz: f64,
}

impl Default for LongToneConfig {
    fn default() -> Self {
        Self {
            min_duration_s: 3.8,
            tone_bw_hz: 25.0,
            min_freq_hz: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarbleConfig {
    pub interval_length_s: f64,
    pub min_alternations: u32,
    pub tone_bw_hz: f64,
    pub min_pair_separation_hz: f64,
}

impl Default for WarbleConfig {
    fn default() -> Self {
        Self {
            interval_length_s: 0.2,
            min_alternations: 6,
            tone_bw_hz: 25.0,
            min_pair_separation_hz: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PulsedConfig {
    pub bw_hz: f64,
    pub min_cycles: u32,
    pub min_on_ms: u32,
    pub max_on_ms: u32,
    pub min_off_ms: u32,
    pub max_off_ms: u32,
    pub auto_center_band_hz: (f64, f64),
    pub mode_bin_hz: f64,
    /// Fraction of zero-valued frames required for a group to classify as OFF.
    pub off_zero_ratio: f64,
}

impl Default for PulsedConfig {
    fn default() -> Self {
        Self {
            bw_hz: 25.0,
            min_cycles: 6,
            min_on_ms: 120,
            max_on_ms: 900,
            min_off_ms: 25,
            max_off_ms: 350,
            auto_center_band_hz: (200.0, 3000.0),
            mode_bin_hz: 5.0,
            off_zero_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Path (or bare name, resolved on `PATH`) to the external decode binary.
    pub decoder_binary: String,
    pub mdc_high_pass_hz: u32,
    pub mdc_low_pass_hz: u32,
    pub dtmf_min_ms: u32,
    pub dtmf_merge_ms: u32,
    pub dtmf_start_offset_ms: i32,
    pub dtmf_end_offset_ms: i32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            decoder_binary: "paging-tone-decode".to_string(),
            mdc_high_pass_hz: 200,
            mdc_low_pass_hz: 4000,
            dtmf_min_ms: 400,
            dtmf_merge_ms: 75,
            dtmf_start_offset_ms: -20,
            dtmf_end_offset_ms: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorToggles {
    pub pulsed: bool,
    pub two_tone: bool,
    pub long_tone: bool,
    pub hi_low: bool,
    pub mdc: bool,
    pub dtmf: bool,
}

impl Default for DetectorToggles {
    fn default() -> Self {
        Self {
            pulsed: true,
            two_tone: true,
            long_tone: true,
            hi_low: true,
            mdc: false,
            dtmf: false,
        }
    }
}

impl EngineConfig {
    /// Resolve `long_tone.min_freq_hz`, defaulting to the frontend's lower
    /// search bound when left unset (0.0).
    pub fn effective_long_tone_min_freq_hz(&self) -> f64 {
        if self.long_tone.min_freq_hz > 0.0 {
            self.long_tone.min_freq_hz
        } else {
            self.frontend.freq_band_hz.0
        }
    }

    /// Validate documented parameter bounds, failing fast rather than letting
    /// a detector misbehave on a nonsensical configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        let (lo, hi) = self.frontend.freq_band_hz;
        if !(lo < hi) {
            return Err(EngineError::ConfigurationInvalid(
                "frontend.freq_band_hz must have low < high".into(),
            ));
        }
        if self.frontend.matching_threshold_pct <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "frontend.matching_threshold_pct must be > 0".into(),
            ));
        }
        if self.two_tone.tone_a_min_length_s <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "two_tone.tone_a_min_length_s must be > 0".into(),
            ));
        }
        if self.two_tone.tone_b_min_length_s <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "two_tone.tone_b_min_length_s must be > 0".into(),
            ));
        }
        if self.two_tone.max_gap_between_a_b_s < 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "two_tone.max_gap_between_a_b_s must be >= 0".into(),
            ));
        }
        if self.two_tone.tone_bw_hz <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "two_tone.tone_bw_hz must be > 0".into(),
            ));
        }
        if self.two_tone.min_pair_separation_hz <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "two_tone.min_pair_separation_hz must be > 0".into(),
            ));
        }
        if self.long_tone.min_duration_s <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "long_tone.min_duration_s must be > 0".into(),
            ));
        }
        if self.long_tone.tone_bw_hz <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "long_tone.tone_bw_hz must be > 0".into(),
            ));
        }
        if self.warble.interval_length_s < 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "warble.interval_length_s must be >= 0".into(),
            ));
        }
        if self.warble.min_alternations < 2 {
            return Err(EngineError::ConfigurationInvalid(
                "warble.min_alternations must be >= 2".into(),
            ));
        }
        if self.warble.tone_bw_hz <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "warble.tone_bw_hz must be > 0".into(),
            ));
        }
        if self.warble.min_pair_separation_hz <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "warble.min_pair_separation_hz must be > 0".into(),
            ));
        }
        if self.pulsed.bw_hz <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "pulsed.bw_hz must be > 0".into(),
            ));
        }
        if self.pulsed.mode_bin_hz <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "pulsed.mode_bin_hz must be > 0".into(),
            ));
        }
        if self.pulsed.min_on_ms > self.pulsed.max_on_ms {
            return Err(EngineError::ConfigurationInvalid(
                "pulsed.min_on_ms must be <= pulsed.max_on_ms".into(),
            ));
        }
        if self.pulsed.min_off_ms > self.pulsed.max_off_ms {
            return Err(EngineError::ConfigurationInvalid(
                "pulsed.min_off_ms must be <= pulsed.max_off_ms".into(),
            ));
        }
        let (plo, phi) = self.pulsed.auto_center_band_hz;
        if !(plo < phi) {
            return Err(EngineError::ConfigurationInvalid(
                "pulsed.auto_center_band_hz must have low < high".into(),
            ));
        }
        Ok(())
    }

    /// Default on-disk location for a saved profile, following this platform's
    /// conventional config directory.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "github", "tonewatch")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tonewatch.toml")
    }

    /// Load a profile from disk, falling back to defaults if not found.
    pub fn load(path: &PathBuf) -> Self {
        Self::try_load(path).unwrap_or_default()
    }

    pub fn try_load(path: &PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_band() {
        let mut cfg = EngineConfig::default();
        cfg.frontend.freq_band_hz = (3000.0, 200.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_on_off_bound_inversion() {
        let mut cfg = EngineConfig::default();
        cfg.pulsed.min_on_ms = 900;
        cfg.pulsed.max_on_ms = 120;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn serialize_roundtrip() {
        let cfg = EngineConfig::default();
        let serialized = toml::to_string_pretty(&cfg).unwrap();
        let back: EngineConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(cfg.frontend.time_resolution_ms, back.frontend.time_resolution_ms);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        let mut cfg = EngineConfig::default();
        cfg.pulsed.min_cycles = 9;
        cfg.save(&path).unwrap();
        let loaded = EngineConfig::load(&path);
        assert_eq!(loaded.pulsed.min_cycles, 9);
    }
}
