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
use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::{info, span, warn, Level};

use super::Event;

const UP: &str = "up";
const DOWN: &str = "down";
const SELECT: &str = "select";
const PAUSE: &str = "pause";
const MENU: &str = "menu";
const FULLSCREEN: &str = "fullscreen";
const QUIT: &str = "quit";

/// A controller that reads the terminal a line at a time. A line is either one of the
/// control words or a run of lane keys, each of which becomes a press on its lane.
pub struct Driver {
    keys: Vec<char>,
}

impl Driver {
    /// Creates a keyboard driver. Lane i is pressed by `keys[i]`.
    pub fn new(keys: Vec<char>) -> Driver {
        Driver { keys }
    }

    /// Reads and dispatches one line. Returns false once the input is exhausted.
    fn monitor_io<R, W>(
        keys: &[char],
        events_tx: &Sender<Event>,
        mut reader: R,
        mut writer: W,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(
            writer,
            "Keys ({}) or command ({}, {}, {}, {}, {}, {}, {}): ",
            keys.iter().collect::<String>(),
            UP,
            DOWN,
            SELECT,
            PAUSE,
            MENU,
            FULLSCREEN,
            QUIT,
        )?;
        writer.flush()?;
        let mut input: String = String::default();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        let input = input.trim().to_lowercase();
        let events = match input.as_str() {
            UP => vec![Event::Up],
            DOWN => vec![Event::Down],
            SELECT => vec![Event::Select],
            PAUSE => vec![Event::Pause],
            MENU => vec![Event::Menu],
            FULLSCREEN => vec![Event::Fullscreen],
            QUIT => vec![Event::Quit],
            _ => input
                .chars()
                .filter(|c| !c.is_whitespace())
                .filter_map(|c| match keys.iter().position(|key| *key == c) {
                    Some(lane) => Some(Event::Lane(lane)),
                    None => {
                        warn!(key = %c, "Unrecognized input");
                        None
                    }
                })
                .collect(),
        };

        for event in events {
            events_tx
                .send(event)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        }
        Ok(true)
    }
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        let keys = self.keys.clone();
        thread::spawn(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            while Self::monitor_io(&keys, &events_tx, io::stdin().lock(), io::stdout())? {}
            info!("Keyboard input closed.");
            Ok(())
        })
    }
}

#[cfg(test)]
mod test {
    use std::io::{self, BufReader, BufWriter};

    use crate::controller::Event;

    use super::{Driver, DOWN, FULLSCREEN, MENU, PAUSE, QUIT, SELECT, UP};

    fn get_events(input: &str) -> Result<(bool, Vec<Event>), io::Error> {
        let (sender, receiver) = crossbeam_channel::unbounded::<Event>();

        let reader = BufReader::new(input.as_bytes());
        let writer = BufWriter::new(Vec::new());
        let more = Driver::monitor_io(&['a', 's', 'd', 'f'], &sender, reader, writer)?;

        // Force the sender to close.
        drop(sender);
        Ok((more, receiver.iter().collect()))
    }

    #[test]
    fn test_keyboard_events() -> Result<(), io::Error> {
        assert_eq!((true, vec![Event::Up]), get_events(UP)?);
        assert_eq!((true, vec![Event::Down]), get_events(DOWN)?);
        assert_eq!((true, vec![Event::Select]), get_events(SELECT)?);
        assert_eq!((true, vec![Event::Pause]), get_events(PAUSE)?);
        assert_eq!((true, vec![Event::Menu]), get_events(MENU)?);
        assert_eq!((true, vec![Event::Fullscreen]), get_events(FULLSCREEN)?);
        assert_eq!((true, vec![Event::Quit]), get_events(QUIT)?);
        // Control words ignore case.
        assert_eq!((true, vec![Event::Quit]), get_events("QUIT\n")?);
        Ok(())
    }

    #[test]
    fn test_lane_keys() -> Result<(), io::Error> {
        assert_eq!(
            (true, vec![Event::Lane(0), Event::Lane(3), Event::Lane(0)]),
            get_events("a f A\n")?
        );
        // Unknown keys are dropped, known ones still go through.
        assert_eq!((true, vec![Event::Lane(1)]), get_events("xs\n")?);
        assert_eq!((true, vec![]), get_events("\n")?);
        Ok(())
    }

    #[test]
    fn test_end_of_input() -> Result<(), io::Error> {
        assert_eq!((false, vec![]), get_events("")?);
        Ok(())
    }
}
