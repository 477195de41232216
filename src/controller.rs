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
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, error, info, span, Level, Span};

pub mod keyboard;

/// Controller events that drive the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A press on a lane, numbered left to right from 0.
    Lane(usize),

    /// Moves the menu selection up.
    Up,

    /// Moves the menu selection down.
    Down,

    /// Starts the selected song.
    Select,

    /// Pauses or resumes the song being played.
    Pause,

    /// Abandons the song being played and goes back to the menu.
    Menu,

    /// Toggles fullscreen. Only meaningful to presenters that have a window.
    Fullscreen,

    /// Exits the game.
    Quit,
}

pub trait Driver: Send + Sync + 'static {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}

/// Collects events from a driver running on its own thread.
pub struct Controller {
    events_rx: Receiver<Event>,
    handle: Option<JoinHandle<Result<(), io::Error>>>,
    closed: bool,
    span: Span,
}

impl Controller {
    /// Creates a new controller and starts the given driver.
    pub fn new(driver: Arc<dyn Driver>) -> Controller {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let handle = driver.monitor_events(events_tx);

        Controller {
            events_rx,
            handle: Some(handle),
            closed: false,
            span: span!(Level::INFO, "controller"),
        }
    }

    /// Takes every event queued since the last poll. Once the driver stops, a final
    /// Quit is returned so the game shuts down with it.
    pub fn poll(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.closed {
            return events;
        }

        loop {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    debug!(event = ?event, "Received event.");
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.close();
                    events.push(Event::Quit);
                    break;
                }
            }
        }
        events
    }

    fn close(&mut self) {
        let _enter = self.span.enter();
        self.closed = true;

        info!("Controller closing.");
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(err = %e, "Event monitor failed"),
                Err(_) => error!("Event monitor panicked"),
            }
        }
    }
}
