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

/// Floor for frame energies so that silence doesn't produce -inf.
const ENERGY_FLOOR: f64 = 1e-10;

/// Dynamic range kept below the loudest frame, in dB.
const TOP_DB: f64 = 80.0;

/// An onset strength envelope: one value per hop, high where energy rises sharply.
#[derive(Debug, Clone)]
pub(super) struct OnsetEnvelope {
    pub values: Vec<f64>,
    pub hop: usize,
    pub sample_rate: u32,
}

impl OnsetEnvelope {
    /// Number of envelope frames per second.
    pub fn frame_rate(&self) -> f64 {
        f64::from(self.sample_rate) / self.hop as f64
    }

    /// The time in seconds of the given frame.
    pub fn time_of(&self, frame: usize) -> f64 {
        (frame * self.hop) as f64 / f64::from(self.sample_rate)
    }

    /// True if no frame carries any onset energy.
    pub fn is_silent(&self) -> bool {
        self.values.iter().all(|v| *v <= 0.0)
    }
}

/// Computes the log-energy flux of a mono signal. Frame `i` is centred on sample
/// `i * hop` and spans two hops, so onset frames line up with their sample position.
pub(super) fn onset_strength(mono: &[f32], sample_rate: u32, hop: usize) -> OnsetEnvelope {
    let hop = hop.max(1);
    let num_frames = mono.len().div_ceil(hop);

    let db: Vec<f64> = (0..num_frames)
        .map(|frame| {
            let center = frame * hop;
            let start = center.saturating_sub(hop);
            let end = (center + hop).min(mono.len());
            let window = &mono[start..end];
            let energy = if window.is_empty() {
                0.0
            } else {
                window.iter().map(|s| f64::from(*s).powi(2)).sum::<f64>() / window.len() as f64
            };
            10.0 * energy.max(ENERGY_FLOOR).log10()
        })
        .collect();

    let loudest = db.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let floor = loudest - TOP_DB;
    let db: Vec<f64> = db.into_iter().map(|v| v.max(floor)).collect();

    let mut values = vec![0.0; num_frames];
    for frame in 1..num_frames {
        values[frame] = (db[frame] - db[frame - 1]).max(0.0);
    }

    OnsetEnvelope {
        values,
        hop,
        sample_rate,
    }
}

#[cfg(test)]
mod test {
    use super::onset_strength;

    #[test]
    fn test_silence_is_flat() {
        let envelope = onset_strength(&[0.0; 4096], 22050, 512);
        assert_eq!(8, envelope.values.len());
        assert!(envelope.is_silent());
    }

    #[test]
    fn test_click_produces_peak_at_click() {
        let mut samples = vec![0.0f32; 512 * 20];
        for sample in samples.iter_mut().skip(512 * 10).take(64) {
            *sample = 0.8;
        }

        let envelope = onset_strength(&samples, 22050, 512);
        let (peak, _) = envelope
            .values
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, v)| if *v > best.1 { (i, *v) } else { best });

        // The click starts on frame 10's centre, so frame 10 is the first window to see it.
        assert_eq!(10, peak);
        assert!((envelope.time_of(peak) - 512.0 * 10.0 / 22050.0).abs() < 1e-9);
        assert!(!envelope.is_silent());
    }
}
