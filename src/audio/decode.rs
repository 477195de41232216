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
use std::fs::File;
use std::io;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::{debug, warn};

use super::error::DecodeError;
use super::Signal;

/// Decodes an entire audio file (WAV, MP3, FLAC, etc.) into memory.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Signal, DecodeError> {
    // Include the path in the error so the user sees which file failed.
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        DecodeError::IoError(io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Unreadable(format!("'{}': {}", path.display(), e)))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            DecodeError::Unreadable(format!("'{}': no audio track found", path.display()))
        })?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Unreadable(format!("'{}': {}", path.display(), e)))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(err)) => {
                // A corrupt packet only costs us a few milliseconds of audio.
                warn!(err, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }
        if channels == 0 {
            channels = spec.channels.count() as u16;
        }

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    let signal = Signal::new(samples, channels, sample_rate);
    signal.validate()?;

    debug!(
        path = %path.display(),
        channels,
        sample_rate,
        frames = signal.frames(),
        "Decoded audio file"
    );

    Ok(signal)
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use hound::{SampleFormat, WavSpec, WavWriter};

    use super::decode_file;
    use crate::audio::DecodeError;

    #[test]
    fn test_decode_wav() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec)?;
        for i in 0..22050 {
            let value = if i % 100 == 0 { i16::MAX / 2 } else { 0 };
            writer.write_sample(value)?;
            writer.write_sample(value)?;
        }
        writer.finalize()?;

        let signal = decode_file(&path)?;
        assert_eq!(2, signal.channels());
        assert_eq!(22050, signal.sample_rate());
        assert_eq!(22050, signal.frames());
        assert!(signal.samples()[0] > 0.4 && signal.samples()[0] < 0.6);
        Ok(())
    }

    #[test]
    fn test_decode_missing_file() {
        assert!(matches!(
            decode_file("/definitely/not/here.wav"),
            Err(DecodeError::IoError(_))
        ));
    }

    #[test]
    fn test_decode_garbage() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile()?;
        file.write_all(b"this is not audio at all")?;
        file.flush()?;

        assert!(decode_file(file.path()).is_err());
        Ok(())
    }
}
