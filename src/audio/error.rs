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
/// Errors raised when audio can't be turned into something analyzable.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Signal contains no samples")]
    Empty,

    #[error("Sample rate must be greater than zero")]
    InvalidSampleRate,

    #[error("Sample {0} is not a finite number")]
    NonFiniteSample(usize),

    #[error("Unable to read audio: {0}")]
    Unreadable(String),

    #[error("Audio file error: {0}")]
    AudioError(#[from] symphonia::core::errors::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
