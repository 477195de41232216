// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use tracing::{debug, info, span, Level, Span};

use crate::audio::{DecodeError, Signal};

mod onset;
mod tempo;
mod tracker;

/// Envelope hop length in seconds (512 samples at 22.05kHz).
const HOP_SECONDS: f64 = 512.0 / 22050.0;

/// Tunables for beat extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Seconds between onset envelope frames.
    pub hop_seconds: f64,
    /// Slowest tempo considered.
    pub min_bpm: f64,
    /// Fastest tempo considered.
    pub max_bpm: f64,
    /// Centre of the tempo prior.
    pub prior_bpm: f64,
    /// Standard deviation of the tempo prior, in octaves.
    pub prior_octaves: f64,
    /// How strictly beats must follow the estimated tempo.
    pub tightness: f64,
    /// Drop weak beats at the start and end of the track.
    pub trim: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            hop_seconds: HOP_SECONDS,
            min_bpm: 40.0,
            max_bpm: 240.0,
            prior_bpm: 120.0,
            prior_octaves: 1.0,
            tightness: 100.0,
            trim: true,
        }
    }
}

/// The result of beat extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatAnalysis {
    /// Estimated tempo in BPM. Zero if the signal has no rhythmic content.
    pub tempo: f64,
    /// Beat onset times in seconds from the start of the signal, non-decreasing.
    pub onsets: Vec<f64>,
}

/// Extracts a tempo estimate and beat onsets from decoded audio.
pub struct BeatExtractor {
    config: AnalysisConfig,
    span: Span,
}

impl Default for BeatExtractor {
    fn default() -> Self {
        BeatExtractor::new(AnalysisConfig::default())
    }
}

impl BeatExtractor {
    /// Creates a new beat extractor.
    pub fn new(config: AnalysisConfig) -> BeatExtractor {
        BeatExtractor {
            config,
            span: span!(Level::INFO, "beat extractor"),
        }
    }

    /// Analyzes the signal. The same buffer always produces the same result.
    pub fn extract(&self, signal: &Signal) -> Result<BeatAnalysis, DecodeError> {
        let _enter = self.span.enter();
        signal.validate()?;

        let sample_rate = signal.sample_rate();
        let hop = ((f64::from(sample_rate) * self.config.hop_seconds).round() as usize).max(1);
        let envelope = onset::onset_strength(&signal.to_mono(), sample_rate, hop);

        if envelope.is_silent() {
            info!(frames = signal.frames(), "Signal has no onsets");
            return Ok(BeatAnalysis {
                tempo: 0.0,
                onsets: Vec::new(),
            });
        }

        let frame_rate = envelope.frame_rate();
        let tempo = match tempo::estimate_tempo(&envelope.values, frame_rate, &self.config) {
            Some(tempo) => tempo,
            None => {
                debug!(
                    prior = self.config.prior_bpm,
                    "No tempo found, tracking at the prior"
                );
                self.config.prior_bpm
            }
        };

        let period = 60.0 * frame_rate / tempo;
        let onsets: Vec<f64> = tracker::track_beats(
            &envelope.values,
            period,
            self.config.tightness,
            self.config.trim,
        )
        .into_iter()
        .map(|frame| envelope.time_of(frame))
        .collect();

        info!(tempo, beats = onsets.len(), "Extracted beats");

        Ok(BeatAnalysis { tempo, onsets })
    }
}

#[cfg(test)]
mod test {
    use super::{AnalysisConfig, BeatExtractor};
    use crate::audio::{DecodeError, Signal};
    use crate::testutil::signals;

    #[test]
    fn test_click_track_tempo_and_onsets() -> Result<(), DecodeError> {
        let signal = signals::click_track(120.0, 22050, 12.0, 0.25);
        let analysis = BeatExtractor::default().extract(&signal)?;

        assert!(
            (analysis.tempo - 120.0).abs() < 5.0,
            "tempo was {}",
            analysis.tempo
        );
        assert!(analysis.onsets.len() >= 18, "{:?}", analysis.onsets);
        assert!(analysis.onsets.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(analysis.onsets.iter().all(|t| t.is_finite() && *t >= 0.0));

        // Every beat should land near a click.
        for onset in analysis.onsets.iter() {
            let offset = (onset - 0.25) / 0.5;
            let distance = (offset - offset.round()).abs() * 0.5;
            assert!(distance < 0.05, "onset {} is {}s from a click", onset, distance);
        }
        Ok(())
    }

    #[test]
    fn test_stereo_matches_mono() -> Result<(), DecodeError> {
        let mono = signals::click_track(100.0, 22050, 8.0, 0.0);
        let stereo = Signal::new(
            mono.samples().iter().flat_map(|s| [*s, *s]).collect(),
            2,
            mono.sample_rate(),
        );

        let extractor = BeatExtractor::default();
        assert_eq!(extractor.extract(&mono)?, extractor.extract(&stereo)?);
        Ok(())
    }

    #[test]
    fn test_deterministic() -> Result<(), DecodeError> {
        let signal = signals::click_track(140.0, 44100, 6.0, 0.1);
        let extractor = BeatExtractor::new(AnalysisConfig::default());
        assert_eq!(extractor.extract(&signal)?, extractor.extract(&signal)?);
        Ok(())
    }

    #[test]
    fn test_silence() -> Result<(), DecodeError> {
        let analysis = BeatExtractor::default().extract(&signals::silence(22050, 3.0))?;
        assert_eq!(0.0, analysis.tempo);
        assert!(analysis.onsets.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_signal_is_an_error() {
        let result = BeatExtractor::default().extract(&Signal::mono(Vec::new(), 22050));
        assert!(matches!(result, Err(DecodeError::Empty)));
    }
}
