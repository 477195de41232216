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
use std::path::Path;

use rand::Rng;
use tracing::{info, span, Level};

use crate::audio::{self, DecodeError};
use crate::beat::BeatExtractor;
use crate::chart::{self, Chart, ChartError};
use crate::lanes::LaneAssigner;

/// Failure of a chart generation job. Only that job is aborted.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Unable to decode audio: {0}")]
    Decode(#[from] DecodeError),

    #[error("Unable to build chart: {0}")]
    Chart(#[from] ChartError),
}

/// A generated chart and the tempo it was tracked at.
#[derive(Debug)]
pub struct Generated {
    pub tempo: f64,
    pub chart: Chart,
}

/// Decodes an audio file, extracts its beats, assigns lanes and saves the chart.
pub fn generate<R: Rng>(
    audio_path: &Path,
    chart_path: &Path,
    extractor: &BeatExtractor,
    assigner: &LaneAssigner,
    rng: &mut R,
) -> Result<Generated, GenerateError> {
    let span = span!(Level::INFO, "generate");
    let _enter = span.enter();

    let signal = audio::decode_file(audio_path)?;
    let analysis = extractor.extract(&signal)?;
    let chart = assigner.assign(&analysis.onsets, rng)?;
    chart::save_to_path(&chart, chart_path)?;

    info!(
        audio = %audio_path.display(),
        chart = %chart_path.display(),
        tempo = analysis.tempo,
        notes = chart.len(),
        "Generated chart"
    );
    Ok(Generated {
        tempo: analysis.tempo,
        chart,
    })
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{generate, GenerateError};
    use crate::beat::BeatExtractor;
    use crate::chart;
    use crate::lanes::{LaneAssigner, LaneStrategy};
    use crate::testutil::{signals, write_wav};

    #[test]
    fn test_generate_from_wav() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let audio = dir.path().join("clicks.wav");
        let chart_path = dir.path().join("clicks.json");
        write_wav(&audio, &signals::click_track(120.0, 22050, 10.0, 0.25))?;

        let assigner = LaneAssigner::new(4, LaneStrategy::NoRepeat)?;
        let generated = generate(
            &audio,
            &chart_path,
            &BeatExtractor::default(),
            &assigner,
            &mut StdRng::seed_from_u64(5),
        )?;

        assert!((generated.tempo - 120.0).abs() < 5.0, "{}", generated.tempo);
        assert!(generated.chart.len() >= 10);
        assert_eq!(generated.chart, chart::load_from_path(&chart_path, 4)?);
        Ok(())
    }

    #[test]
    fn test_silence_makes_an_empty_chart() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let audio = dir.path().join("silence.wav");
        let chart_path = dir.path().join("silence.json");
        write_wav(&audio, &signals::silence(22050, 2.0))?;

        let assigner = LaneAssigner::new(4, LaneStrategy::Random)?;
        let generated = generate(
            &audio,
            &chart_path,
            &BeatExtractor::default(),
            &assigner,
            &mut StdRng::seed_from_u64(5),
        )?;
        assert_eq!(0.0, generated.tempo);
        assert!(generated.chart.is_empty());
        assert_eq!("[]", std::fs::read_to_string(&chart_path)?);
        Ok(())
    }

    #[test]
    fn test_missing_audio() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let assigner = LaneAssigner::new(4, LaneStrategy::Random)?;
        let result = generate(
            &dir.path().join("missing.wav"),
            &dir.path().join("missing.json"),
            &BeatExtractor::default(),
            &assigner,
            &mut StdRng::seed_from_u64(5),
        );
        assert!(matches!(result, Err(GenerateError::Decode(_))));
        assert!(!dir.path().join("missing.json").exists());
        Ok(())
    }
}
