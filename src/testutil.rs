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
use std::{
    error::Error,
    path::Path,
    thread,
    time::{Duration, SystemTime},
};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::Signal;

/// Synthetic signals for exercising beat extraction.
pub mod signals {
    use std::f32::consts::PI;

    use crate::audio::Signal;

    /// Length of each click.
    const CLICK_SECONDS: f32 = 0.01;

    /// A mono click track: a short decaying 1kHz burst every beat, starting at `offset` seconds.
    pub fn click_track(bpm: f64, sample_rate: u32, duration_seconds: f32, offset: f64) -> Signal {
        let sample_count = (sample_rate as f32 * duration_seconds) as usize;
        let mut samples = vec![0.0f32; sample_count];
        let click_length = (sample_rate as f32 * CLICK_SECONDS) as usize;
        let interval = 60.0 / bpm;

        let mut beat = offset;
        while beat < f64::from(duration_seconds) {
            let start = (beat * f64::from(sample_rate)).round() as usize;
            for i in 0..click_length {
                let Some(sample) = samples.get_mut(start + i) else {
                    break;
                };
                let t = i as f32 / sample_rate as f32;
                let decay = 1.0 - i as f32 / click_length as f32;
                *sample = 0.8 * decay * (2.0 * PI * 1000.0 * t).sin();
            }
            beat += interval;
        }

        Signal::mono(samples, sample_rate)
    }

    /// A mono signal of all zeros.
    pub fn silence(sample_rate: u32, duration_seconds: f32) -> Signal {
        Signal::mono(
            vec![0.0; (sample_rate as f32 * duration_seconds) as usize],
            sample_rate,
        )
    }
}

/// Writes a signal to disk as a 32 bit float WAV file.
pub fn write_wav(path: &Path, signal: &Signal) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels: signal.channels(),
            sample_rate: signal.sample_rate(),
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    )?;

    for sample in signal.samples() {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Wait for the given predicate to return true or fail.
#[inline]
pub fn eventually<F>(predicate: F, error_msg: &str)
where
    F: Fn() -> bool,
{
    let start = SystemTime::now();
    let tick = Duration::from_millis(10);
    let timeout = Duration::from_secs(3);

    loop {
        let elapsed = match start.elapsed() {
            Ok(elapsed) => elapsed,
            Err(_) => panic!("System time error"),
        };

        if elapsed > timeout {
            panic!("{}", error_msg);
        }
        if predicate() {
            return;
        }
        thread::sleep(tick);
    }
}
