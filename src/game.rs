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
use std::time::{Duration, Instant};

use tracing::{debug, error, info, span, warn, Level, Span};

use crate::catalog::Catalog;
use crate::chart::ChartError;
use crate::clock::PlaybackClock;
use crate::controller::{Controller, Event};
use crate::play::{Feedback, PlaySettings, ScoreState, Session, SessionView};

/// What the game is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
}

/// Draws the game. Everything a presenter is handed is read only.
pub trait Presenter {
    /// Shows the song list.
    fn menu(&mut self, catalog: &Catalog);

    /// Draws a frame of the song being played.
    fn frame(&mut self, view: &SessionView);

    /// Shows the result of a finished song.
    fn finished(&mut self, title: &str, score: &ScoreState);

    fn fullscreen(&mut self, enabled: bool);
}

/// A presenter for terminals: logs feedback as it changes rather than drawing.
#[derive(Default)]
pub struct LogPresenter {
    last_feedback_time: Option<Duration>,
}

impl LogPresenter {
    pub fn new() -> LogPresenter {
        LogPresenter::default()
    }
}

impl Presenter for LogPresenter {
    fn menu(&mut self, catalog: &Catalog) {
        info!("{}", catalog);
    }

    fn frame(&mut self, view: &SessionView) {
        if view.last_feedback_time == self.last_feedback_time {
            return;
        }
        self.last_feedback_time = view.last_feedback_time;

        match view.last_feedback {
            Some(Feedback::Hit) => info!(points = view.points, combo = view.combo, "Hit!"),
            Some(Feedback::Miss) => info!(points = view.points, "Miss!"),
            None => {}
        }
    }

    fn finished(&mut self, title: &str, score: &ScoreState) {
        info!(song = title, "{}", score);
    }

    fn fullscreen(&mut self, enabled: bool) {
        debug!(enabled, "Fullscreen has no effect in a terminal");
    }
}

/// The game: a menu of songs and, once one is selected, a session playing it.
pub struct Game {
    settings: PlaySettings,
    catalog: Catalog,
    clock: PlaybackClock,
    session: Option<Session>,
    state: GameState,
    /// Title of the song being played.
    playing: Option<String>,
    fullscreen: bool,
    running: bool,
    span: Span,
}

impl Game {
    /// Creates a new game in the menu.
    pub fn new(settings: PlaySettings, catalog: Catalog, clock: PlaybackClock) -> Game {
        Game {
            settings,
            catalog,
            clock,
            session: None,
            state: GameState::Menu,
            playing: None,
            fullscreen: false,
            running: true,
            span: span!(Level::INFO, "game"),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Starts the song under the catalog cursor. If its chart can't be loaded the game
    /// stays in the menu.
    pub fn select(&mut self) -> Result<(), ChartError> {
        let Some(song) = self.catalog.current() else {
            warn!("No songs to select");
            return Ok(());
        };

        let chart = match song.load_chart(self.settings.lanes) {
            Ok(chart) => chart,
            Err(e) => {
                error!(song = song.title(), err = %e, "Unable to load chart");
                return Err(e);
            }
        };

        let title = song.title().to_string();
        let mut session = Session::new(self.settings.clone());
        session.start(&chart, self.clock.now());
        info!(song = title, notes = chart.len(), "Playing song");

        self.session = Some(session);
        self.playing = Some(title);
        self.state = GameState::Playing;
        Ok(())
    }

    /// Runs a frame: handles the events in order, then advances the session and hands
    /// the result to the presenter. Returns false once the game should exit.
    pub fn frame(&mut self, events: &[Event], presenter: &mut dyn Presenter) -> bool {
        let span = self.span.clone();
        let _enter = span.enter();

        let now = self.clock.now();
        for event in events {
            self.handle(*event, now, presenter);
        }

        if self.state == GameState::Playing {
            if let Some(session) = self.session.as_mut() {
                session.tick(now);
                presenter.frame(&session.view(now));

                if session.is_finished() {
                    let title = self.playing.take().unwrap_or_default();
                    info!(song = title, points = session.score().points(), "Song finished");
                    presenter.finished(&title, session.score());
                    self.back_to_menu(presenter);
                }
            }
        }

        self.running
    }

    /// Drives the game from a controller at a fixed frame rate until it quits.
    pub fn run(
        &mut self,
        controller: &mut Controller,
        presenter: &mut dyn Presenter,
        frame_rate: u32,
    ) {
        let frame_duration = Duration::from_secs(1).div_f64(f64::from(frame_rate.max(1)));
        let mut next_frame = Instant::now();

        presenter.menu(&self.catalog);
        loop {
            let events = controller.poll();
            if !self.frame(&events, presenter) {
                info!("Quitting");
                return;
            }

            next_frame += frame_duration;
            spin_sleep::sleep(next_frame.saturating_duration_since(Instant::now()));
        }
    }

    fn handle(&mut self, event: Event, now: Duration, presenter: &mut dyn Presenter) {
        match (self.state, event) {
            (_, Event::Quit) => self.running = false,
            (_, Event::Fullscreen) => {
                self.fullscreen = !self.fullscreen;
                presenter.fullscreen(self.fullscreen);
            }

            (GameState::Menu, Event::Up) => {
                self.catalog.prev();
                presenter.menu(&self.catalog);
            }
            (GameState::Menu, Event::Down) => {
                self.catalog.next();
                presenter.menu(&self.catalog);
            }
            (GameState::Menu, Event::Select) => {
                if self.select().is_err() {
                    presenter.menu(&self.catalog);
                }
            }

            (GameState::Playing, Event::Lane(lane)) => {
                if let Some(session) = self.session.as_mut() {
                    if let Err(e) = session.hit(lane, now) {
                        warn!(err = %e, "Dropping press");
                    }
                }
            }
            (GameState::Playing, Event::Pause) => {
                self.clock.pause();
                self.state = GameState::Paused;
                info!("Paused");
            }
            (GameState::Paused, Event::Pause) => {
                self.clock.resume();
                self.state = GameState::Playing;
                info!("Resumed");
            }
            (GameState::Playing | GameState::Paused, Event::Menu) => {
                info!(song = self.playing.as_deref(), "Abandoning song");
                self.back_to_menu(presenter);
            }

            (state, event) => debug!(?state, ?event, "Ignoring event"),
        }
    }

    fn back_to_menu(&mut self, presenter: &mut dyn Presenter) {
        self.clock.resume();
        self.session = None;
        self.playing = None;
        self.state = GameState::Menu;
        presenter.menu(&self.catalog);
    }
}
