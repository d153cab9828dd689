//! Invokes the external MDC1200/FleetSync and DTMF decoders as subprocesses,
//! piping raw 16-bit PCM via stdin and parsing one JSON record per stdout
//! line. The decoder binary itself is out of scope (§4's "opaque
//! collaborators"); this module only knows how to talk to it.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::warn;

use crate::config::DecoderConfig;
use crate::error::EngineError;

/// Which decode mode to invoke the external binary in.
#[derive(Debug, Clone, Copy)]
pub enum DecodeMode {
    Mdc,
    Dtmf,
}

/// Run the configured decoder binary against `samples` (mono, `sample_rate`
/// Hz), returning the parsed JSON records it printed to stdout.
pub fn run(
    mode: DecodeMode,
    samples: &[f32],
    cfg: &DecoderConfig,
) -> Result<Vec<serde_json::Value>, EngineError> {
    let pcm: Vec<u8> = samples
        .iter()
        .flat_map(|&s| (to_i16(s)).to_le_bytes())
        .collect();

    let mut cmd = Command::new(&cfg.decoder_binary);
    match mode {
        DecodeMode::Mdc => {
            cmd.args([
                "-m",
                "mdc",
                "-",
                "--mdc-high-pass-hz",
                &cfg.mdc_high_pass_hz.to_string(),
                "--mdc-low-pass-hz",
                &cfg.mdc_low_pass_hz.to_string(),
            ]);
        }
        DecodeMode::Dtmf => {
            cmd.args([
                "-m",
                "dtmf",
                "-",
                "--dtmf-min-ms",
                &cfg.dtmf_min_ms.to_string(),
                "--dtmf-merge-ms",
                &cfg.dtmf_merge_ms.to_string(),
                "--dtmf-start-offset-ms",
                &cfg.dtmf_start_offset_ms.to_string(),
                "--dtmf-end-offset-ms",
                &cfg.dtmf_end_offset_ms.to_string(),
            ]);
        }
    }

    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::ExternalToolMissing(cfg.decoder_binary.clone())
            } else {
                EngineError::ToneDetection(format!("failed to spawn {}: {e}", cfg.decoder_binary))
            }
        })?;

    {
        let stdin = child
            .stdin
            .as_mut()
            .ok_or_else(|| EngineError::ToneDetection("decoder stdin unavailable".into()))?;
        stdin
            .write_all(&pcm)
            .map_err(|e| EngineError::ToneDetection(format!("failed to write PCM to decoder: {e}")))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| EngineError::ToneDetection(format!("decoder process failed: {e}")))?;

    if !output.status.success() {
        return Err(EngineError::ToneDetection(format!(
            "{} exited with status {}: {}",
            cfg.decoder_binary,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut records = Vec::new();
    for line in stdout.lines() {
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => records.push(value),
            Err(e) => warn!(line, error = %e, "skipping malformed decoder output line"),
        }
    }
    Ok(records)
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_surfaces_as_external_tool_missing() {
        let cfg = DecoderConfig {
            decoder_binary: "definitely-not-a-real-binary-xyz".to_string(),
            ..DecoderConfig::default()
        };
        let err = run(DecodeMode::Mdc, &[0.0; 100], &cfg).unwrap_err();
        assert!(matches!(err, EngineError::ExternalToolMissing(_)));
    }
}
