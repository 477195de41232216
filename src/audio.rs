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
use std::time::Duration;

mod decode;
mod error;

pub use decode::decode_file;
pub use error::DecodeError;

/// A decoded block of PCM audio handed to beat analysis.
/// Samples are interleaved f32 in the range [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl Signal {
    /// Creates a new signal from interleaved samples.
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Signal {
        Signal {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Creates a single channel signal.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Signal {
        Signal::new(samples, 1, sample_rate)
    }

    /// Gets the interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Gets the number of channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Gets the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / usize::from(self.channels)
    }

    /// Returns true if there is nothing to analyze.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Returns the length of the signal.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    /// Averages all channels into a single channel. Trailing samples that don't form
    /// a complete frame are ignored.
    pub fn to_mono(&self) -> Vec<f32> {
        let channels = usize::from(self.channels);
        match channels {
            0 => Vec::new(),
            1 => self.samples.clone(),
            _ => self
                .samples
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect(),
        }
    }

    /// Checks that the signal can be analyzed.
    pub(crate) fn validate(&self) -> Result<(), DecodeError> {
        if self.sample_rate == 0 {
            return Err(DecodeError::InvalidSampleRate);
        }
        if self.channels == 0 || self.is_empty() {
            return Err(DecodeError::Empty);
        }
        if let Some(position) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(DecodeError::NonFiniteSample(position));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{DecodeError, Signal};

    #[test]
    fn test_to_mono() {
        let signal = Signal::new(vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0, 0.25], 2, 4);
        assert_eq!(3, signal.frames());
        assert_eq!(vec![0.5, 0.5, 0.0], signal.to_mono());
        assert_eq!(Duration::from_millis(750), signal.duration());
    }

    #[test]
    fn test_validate() {
        assert!(Signal::mono(vec![0.0; 10], 44100).validate().is_ok());
        assert!(matches!(
            Signal::mono(vec![], 44100).validate(),
            Err(DecodeError::Empty)
        ));
        assert!(matches!(
            Signal::mono(vec![0.0; 10], 0).validate(),
            Err(DecodeError::InvalidSampleRate)
        ));
        assert!(matches!(
            Signal::new(vec![0.0; 10], 0, 44100).validate(),
            Err(DecodeError::Empty)
        ));
        assert!(matches!(
            Signal::mono(vec![0.0, f32::NAN], 44100).validate(),
            Err(DecodeError::NonFiniteSample(1))
        ));
    }
}
