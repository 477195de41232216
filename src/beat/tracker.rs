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
//! Dynamic programming beat tracker.
//!
//! Every envelope frame gets a cumulative score: its own (smoothed) onset strength plus
//! the best cumulative score of a predecessor between half and two beat periods back,
//! penalised by how far the gap strays from the period on a log scale. The beat
//! sequence is recovered by backtracking from the last strong frame.

/// Fraction of the peak local score below which leading frames can't start a beat chain.
const FIRST_BEAT_THRESHOLD: f64 = 0.01;

/// Tracks beats through `envelope` given a beat period in frames. Returned frame indices
/// are strictly increasing.
pub(super) fn track_beats(envelope: &[f64], period: f64, tightness: f64, trim: bool) -> Vec<usize> {
    if envelope.is_empty() || !period.is_finite() || period < 1.0 {
        return Vec::new();
    }

    let deviation = standard_deviation(envelope);
    if deviation <= 0.0 {
        return Vec::new();
    }
    let normalized: Vec<f64> = envelope.iter().map(|v| v / deviation).collect();
    let local = local_score(&normalized, period);
    let local_max = local.iter().copied().fold(0.0, f64::max);
    if local_max <= 0.0 {
        return Vec::new();
    }

    let furthest = (2.0 * period).round() as usize;
    let nearest = ((period / 2.0).round() as usize).max(1);
    let offsets: Vec<usize> = (nearest..=furthest.max(nearest)).rev().collect();
    let penalties: Vec<f64> = offsets
        .iter()
        .map(|offset| -tightness * (*offset as f64 / period).ln().powi(2))
        .collect();

    let mut cumulative = vec![0.0; local.len()];
    let mut backlink: Vec<Option<usize>> = vec![None; local.len()];
    let mut first_beat = true;

    for i in 0..local.len() {
        let mut best_score = f64::NEG_INFINITY;
        let mut best_frame = None;
        for (offset, penalty) in offsets.iter().zip(penalties.iter()) {
            let (score, frame) = match i.checked_sub(*offset) {
                Some(previous) => (cumulative[previous] + penalty, Some(previous)),
                None => (*penalty, None),
            };
            if score > best_score {
                best_score = score;
                best_frame = frame;
            }
        }

        cumulative[i] = local[i] + best_score;
        if first_beat && local[i] < FIRST_BEAT_THRESHOLD * local_max {
            backlink[i] = None;
        } else {
            backlink[i] = best_frame;
            first_beat = false;
        }
    }

    let Some(last) = last_beat(&cumulative) else {
        return Vec::new();
    };

    let mut beats = vec![last];
    while let Some(previous) = backlink[beats[beats.len() - 1]] {
        beats.push(previous);
    }
    beats.reverse();

    if trim {
        trim_beats(&local, beats)
    } else {
        beats
    }
}

/// Convolves the envelope with a gaussian whose width scales with the period.
fn local_score(envelope: &[f64], period: f64) -> Vec<f64> {
    let reach = period.floor() as isize;
    let kernel: Vec<(isize, f64)> = (-reach..=reach)
        .map(|k| (k, (-0.5 * (k as f64 * 32.0 / period).powi(2)).exp()))
        .collect();

    (0..envelope.len() as isize)
        .map(|i| {
            kernel
                .iter()
                .filter_map(|(k, weight)| {
                    let j = i + k;
                    (j >= 0 && (j as usize) < envelope.len()).then(|| envelope[j as usize] * weight)
                })
                .sum()
        })
        .collect()
}

/// Picks the last frame that is a local maximum of the cumulative score and exceeds
/// half of the median local-maximum score.
fn last_beat(cumulative: &[f64]) -> Option<usize> {
    let maxima = local_maxima(cumulative);
    let mut peak_scores: Vec<f64> = maxima.iter().map(|i| cumulative[*i]).collect();
    if peak_scores.is_empty() {
        return None;
    }
    peak_scores.sort_by(|a, b| a.total_cmp(b));
    let median = if peak_scores.len() % 2 == 1 {
        peak_scores[peak_scores.len() / 2]
    } else {
        let upper = peak_scores.len() / 2;
        0.5 * (peak_scores[upper - 1] + peak_scores[upper])
    };

    maxima
        .into_iter()
        .filter(|i| 2.0 * cumulative[*i] > median)
        .max()
}

/// Indices strictly greater than the left neighbour and no less than the right one.
/// The first element has no left neighbour and is never a maximum.
fn local_maxima(values: &[f64]) -> Vec<usize> {
    (1..values.len())
        .filter(|i| {
            let right = values.get(i + 1).copied().unwrap_or(values[*i]);
            values[*i] > values[i - 1] && values[*i] >= right
        })
        .collect()
}

/// Drops weak beats from both ends of the sequence.
fn trim_beats(local: &[f64], beats: Vec<usize>) -> Vec<usize> {
    let strengths: Vec<f64> = beats.iter().map(|b| local[*b]).collect();
    // A five point hann window is [0, 0.5, 1, 0.5, 0].
    let smoothed: Vec<f64> = (0..strengths.len())
        .map(|i| {
            let left = if i > 0 { strengths[i - 1] } else { 0.0 };
            let right = strengths.get(i + 1).copied().unwrap_or(0.0);
            0.5 * left + strengths[i] + 0.5 * right
        })
        .collect();

    let rms = (smoothed.iter().map(|v| v * v).sum::<f64>() / smoothed.len() as f64).sqrt();
    let threshold = 0.5 * rms;

    let first = smoothed.iter().position(|v| *v > threshold);
    let last = smoothed.iter().rposition(|v| *v > threshold);
    match (first, last) {
        (Some(first), Some(last)) => beats[first..=last].to_vec(),
        _ => beats,
    }
}

fn standard_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return values.first().map(|v| v.abs()).unwrap_or(0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
