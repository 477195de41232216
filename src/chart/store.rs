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
//! Chart files are JSON arrays of `[lane, onset_seconds]` pairs.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde_json::Value;
use tracing::info;

use super::{Chart, ChartEntry, ChartError};

/// Writes the chart as a JSON array of `[lane, time]` pairs.
pub fn save<W: Write>(chart: &Chart, writer: W) -> Result<(), ChartError> {
    let pairs: Vec<(usize, f64)> = chart
        .entries()
        .iter()
        .map(|entry| (entry.lane, entry.time))
        .collect();
    serde_json::to_writer(writer, &pairs)?;
    Ok(())
}

/// Reads a chart for the given number of lanes. Anything that isn't a time sorted list of
/// `[non-negative integer lane, non-negative number]` pairs is reported as corrupt.
pub fn load<R: Read>(reader: R, lanes: usize) -> Result<Chart, ChartError> {
    let value: Value = serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            ChartError::Io(io::Error::from(e))
        } else {
            ChartError::Corrupt(format!("not valid JSON: {}", e))
        }
    })?;

    let Value::Array(items) = value else {
        return Err(ChartError::Corrupt("expected a list of notes".to_string()));
    };

    let entries = items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_entry(index, item))
        .collect::<Result<Vec<ChartEntry>, ChartError>>()?;

    Chart::new(lanes, entries)
}

fn parse_entry(index: usize, item: &Value) -> Result<ChartEntry, ChartError> {
    let pair = match item.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        _ => {
            return Err(ChartError::Corrupt(format!(
                "entry {} is not a [lane, time] pair: {}",
                index, item
            )))
        }
    };

    let lane = pair[0]
        .as_u64()
        .and_then(|lane| usize::try_from(lane).ok())
        .ok_or_else(|| {
            ChartError::Corrupt(format!(
                "entry {} has a lane that isn't a non-negative integer: {}",
                index, pair[0]
            ))
        })?;
    let time = pair[1].as_f64().ok_or_else(|| {
        ChartError::Corrupt(format!(
            "entry {} has a time that isn't a number: {}",
            index, pair[1]
        ))
    })?;

    Ok(ChartEntry::new(lane, time))
}

/// Saves the chart to a file, replacing anything already there.
pub fn save_to_path(chart: &Chart, path: &Path) -> Result<(), ChartError> {
    let mut writer = BufWriter::new(File::create(path)?);
    save(chart, &mut writer)?;
    writer.flush()?;

    info!(path = %path.display(), notes = chart.len(), "Saved chart");
    Ok(())
}

/// Loads a chart from a file.
pub fn load_from_path(path: &Path, lanes: usize) -> Result<Chart, ChartError> {
    let chart = load(BufReader::new(File::open(path)?), lanes)?;

    info!(path = %path.display(), notes = chart.len(), "Loaded chart");
    Ok(chart)
}
