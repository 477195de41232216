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
use super::AnalysisConfig;

/// Estimates the tempo in BPM of an onset envelope sampled at `frame_rate` Hz.
///
/// The envelope is lightly smoothed and autocorrelated over the lags that fall inside
/// the configured BPM range. Each lag is weighted by a log-normal prior around
/// `prior_bpm` so that half/double tempo candidates don't win on raw correlation alone.
/// Returns None if no lag carries any correlation.
pub(super) fn estimate_tempo(
    envelope: &[f64],
    frame_rate: f64,
    config: &AnalysisConfig,
) -> Option<f64> {
    if envelope.len() < 3 || frame_rate <= 0.0 {
        return None;
    }

    let smoothed = smooth(envelope);
    let min_lag = ((60.0 * frame_rate / config.max_bpm).floor() as usize).max(1);
    let max_lag = ((60.0 * frame_rate / config.min_bpm).ceil() as usize).min(smoothed.len() - 1);
    if min_lag > max_lag {
        return None;
    }

    let scores: Vec<f64> = (min_lag..=max_lag)
        .map(|lag| {
            let correlation: f64 = smoothed
                .iter()
                .zip(smoothed.iter().skip(lag))
                .map(|(a, b)| a * b)
                .sum();
            correlation * prior_weight(60.0 * frame_rate / lag as f64, config)
        })
        .collect();

    let (best, best_score) = scores
        .iter()
        .enumerate()
        .fold((0, 0.0), |best, (i, s)| if *s > best.1 { (i, *s) } else { best });
    if best_score <= 0.0 {
        return None;
    }

    // Parabolic interpolation between neighbouring lags.
    let mut lag = (min_lag + best) as f64;
    if best > 0 && best + 1 < scores.len() {
        let (left, center, right) = (scores[best - 1], scores[best], scores[best + 1]);
        let denominator = left - 2.0 * center + right;
        if denominator.abs() > f64::EPSILON {
            let shift = 0.5 * (left - right) / denominator;
            if shift.abs() <= 0.5 {
                lag += shift;
            }
        }
    }

    Some(60.0 * frame_rate / lag)
}

fn prior_weight(bpm: f64, config: &AnalysisConfig) -> f64 {
    let octaves = (bpm / config.prior_bpm).log2() / config.prior_octaves;
    (-0.5 * octaves * octaves).exp()
}

fn smooth(values: &[f64]) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let left = if i > 0 { values[i - 1] } else { 0.0 };
            let right = values.get(i + 1).copied().unwrap_or(0.0);
            0.25 * left + 0.5 * values[i] + 0.25 * right
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::estimate_tempo;
    use crate::beat::AnalysisConfig;

    fn pulse_train(period: f64, frames: usize) -> Vec<f64> {
        let mut envelope = vec![0.0; frames];
        let mut position: f64 = 0.0;
        while (position as usize) < frames {
            envelope[position.round() as usize % frames] = 1.0;
            position += period;
        }
        envelope
    }

    #[test]
    fn test_integer_period() {
        // 20 frames at 40 Hz is half a second: 120 BPM.
        let tempo = estimate_tempo(&pulse_train(20.0, 800), 40.0, &AnalysisConfig::default())
            .expect("tempo should be found");
        assert!((tempo - 120.0).abs() < 1.0, "tempo was {}", tempo);
    }

    #[test]
    fn test_fractional_period() {
        let frame_rate = 22050.0 / 512.0;
        let period = 0.5 * frame_rate;
        let tempo = estimate_tempo(&pulse_train(period, 1000), frame_rate, &AnalysisConfig::default())
            .expect("tempo should be found");
        assert!((tempo - 120.0).abs() < 5.0, "tempo was {}", tempo);
    }

    #[test]
    fn test_flat_envelope() {
        assert_eq!(
            None,
            estimate_tempo(&[0.0; 500], 43.0, &AnalysisConfig::default())
        );
        assert_eq!(None, estimate_tempo(&[1.0], 43.0, &AnalysisConfig::default()));
    }
}
