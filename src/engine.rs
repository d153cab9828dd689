//! Top-level entry point: load → STFT → group → cascade → external decoders.

use tracing::{debug, info};

use crate::audio::{self, AudioClip, AudioSource};
use crate::cascade;
use crate::config::EngineConfig;
use crate::decoders::{self, DecodeMode};
use crate::dsp::{group_frames, extract_frequencies};
use crate::error::EngineError;
use crate::model::AnalysisResult;

/// Run a full analysis pass: load the given source, extract and group
/// frequencies, run the detector cascade, and (if enabled) the external
/// decoders. Single-threaded, synchronous, deterministic for a given input
/// and configuration.
pub fn analyze(source: AudioSource, cfg: &EngineConfig) -> Result<AnalysisResult, EngineError> {
    cfg.validate()?;

    let clip = audio::load(source).map_err(|e| EngineError::AudioLoad(e.to_string()))?;
    info!(
        sample_rate = clip.sample_rate,
        duration_s = clip.duration_seconds,
        "loaded audio clip"
    );

    analyze_clip(&clip, cfg)
}

/// Run analysis directly on an already-loaded clip. Exposed so callers who
/// already have decoded samples (e.g. tests, or a caller with its own
/// ingestion pipeline) can skip the loader.
pub fn analyze_clip(clip: &AudioClip, cfg: &EngineConfig) -> Result<AnalysisResult, EngineError> {
    cfg.validate()?;

    let frames = extract_frequencies(&clip.samples, clip.sample_rate, &cfg.frontend)
        .map_err(|e| EngineError::FrequencyExtraction(e.to_string()))?;
    debug!(frame_count = frames.len(), "extracted STFT frames");

    let groups = group_frames(&frames, &cfg.frontend);
    debug!(group_count = groups.len(), "grouped frames");

    if cfg.debug {
        for g in &groups {
            debug!(start = g.start_s, end = g.end_s, center = g.center(), off = g.is_off(), "group");
        }
    }

    let cascade_result = cascade::run(&groups, cfg);

    let mdc = if cfg.detectors.mdc {
        decoders::run(DecodeMode::Mdc, &clip.samples, &cfg.decoders)?
    } else {
        Vec::new()
    };

    let dtmf = if cfg.detectors.dtmf {
        decoders::run(DecodeMode::Dtmf, &clip.samples, &cfg.decoders)?
    } else {
        Vec::new()
    };

    Ok(AnalysisResult {
        pulsed: cascade_result.pulsed,
        two_tone: cascade_result.two_tone,
        long: cascade_result.long,
        hi_low: cascade_result.hi_low,
        mdc,
        dtmf,
    })
}
