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
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "quanta")]
use quanta::Instant;
#[cfg(not(feature = "quanta"))]
use std::time::Instant;

/// A monotonic source of elapsed time.
pub trait TimeSource: Send + Sync {
    /// Time elapsed since the source was created.
    fn elapsed(&self) -> Duration;
}

/// Wall clock time. Uses the TSC based timer when built with the quanta feature.
pub struct SystemTime {
    start: Instant,
}

impl SystemTime {
    pub fn new() -> SystemTime {
        SystemTime {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        SystemTime::new()
    }
}

impl TimeSource for SystemTime {
    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.start)
    }
}

/// Time that only moves when told to. Clones share the same time, so a test or a
/// headless simulation can hold one handle while the clock owns another.
#[derive(Clone, Default)]
pub struct ManualTime {
    nanos: Arc<AtomicU64>,
}

impl ManualTime {
    pub fn new() -> ManualTime {
        ManualTime::default()
    }

    /// Moves time forward.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Jumps to the given time. Going backwards is ignored.
    pub fn set(&self, to: Duration) {
        self.nanos.fetch_max(to.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// The process-wide song clock. Reports time since the clock was created, excluding
/// any time spent paused.
pub struct PlaybackClock {
    source: Box<dyn TimeSource>,
    paused_at: Option<Duration>,
    paused_total: Duration,
}

impl PlaybackClock {
    /// Creates a new playback clock reading from the given source.
    pub fn new(source: Box<dyn TimeSource>) -> PlaybackClock {
        PlaybackClock {
            source,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Creates a clock backed by the wall clock.
    pub fn system() -> PlaybackClock {
        PlaybackClock::new(Box::new(SystemTime::new()))
    }

    /// The current time. Frozen while paused.
    pub fn now(&self) -> Duration {
        let raw = self.paused_at.unwrap_or_else(|| self.source.elapsed());
        raw.saturating_sub(self.paused_total)
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Freezes the clock. Pausing twice is a no-op.
    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(self.source.elapsed());
        }
    }

    /// Resumes the clock from where it was paused.
    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += self.source.elapsed().saturating_sub(paused_at);
        }
    }
}

/// Tracks when the next beat interval elapses.
#[derive(Debug, Clone)]
pub struct BeatTimer {
    interval: Duration,
    last_beat: Duration,
}

impl BeatTimer {
    /// Creates a timer for the given tempo whose first interval starts at `start`.
    pub fn new(bpm: f64, start: Duration) -> BeatTimer {
        BeatTimer {
            interval: beat_interval(bpm),
            last_beat: start,
        }
    }

    /// The time between beats.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true if at least one interval has passed since the last beat. The next
    /// interval is measured from `now`, so a late poll delays every following beat, and
    /// a poll that is several intervals late still only fires once.
    pub fn poll(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_beat) >= self.interval {
            self.last_beat = now;
            return true;
        }
        false
    }
}

/// The beat interval for a tempo: 60000 / BPM milliseconds. Tempos too slow to
/// represent never fire.
pub fn beat_interval(bpm: f64) -> Duration {
    Duration::try_from_secs_f64(60.0 / bpm).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{beat_interval, BeatTimer, ManualTime, PlaybackClock};

    #[test]
    fn test_beat_interval() {
        assert_eq!(Duration::from_millis(500), beat_interval(120.0));
        assert_eq!(Duration::from_secs(1), beat_interval(60.0));
        assert_eq!(Duration::MAX, beat_interval(1e-300));
        assert_eq!(Duration::MAX, beat_interval(0.0));
    }

    #[test]
    fn test_unrepresentable_tempo_never_fires() {
        let mut timer = BeatTimer::new(1e-300, Duration::ZERO);
        assert!(!timer.poll(Duration::from_secs(1_000_000)));
    }

    #[test]
    fn test_beat_timer() {
        let mut timer = BeatTimer::new(120.0, Duration::from_millis(100));
        assert!(!timer.poll(Duration::from_millis(599)));
        assert!(timer.poll(Duration::from_millis(600)));
        assert!(!timer.poll(Duration::from_millis(600)));

        // Late polls re-anchor at the time they fire and only fire once.
        assert!(timer.poll(Duration::from_millis(2000)));
        assert!(!timer.poll(Duration::from_millis(2499)));
        assert!(timer.poll(Duration::from_millis(2500)));
    }

    #[test]
    fn test_manual_clock() {
        let time = ManualTime::new();
        let clock = PlaybackClock::new(Box::new(time.clone()));
        assert_eq!(Duration::ZERO, clock.now());

        time.advance(Duration::from_millis(16));
        assert_eq!(Duration::from_millis(16), clock.now());

        time.set(Duration::from_millis(10));
        assert_eq!(Duration::from_millis(16), clock.now());
    }

    #[test]
    fn test_pause_excludes_paused_time() {
        let time = ManualTime::new();
        let mut clock = PlaybackClock::new(Box::new(time.clone()));

        time.advance(Duration::from_secs(1));
        clock.pause();
        clock.pause();
        assert!(clock.is_paused());
        time.advance(Duration::from_secs(5));
        assert_eq!(Duration::from_secs(1), clock.now());

        clock.resume();
        assert!(!clock.is_paused());
        assert_eq!(Duration::from_secs(1), clock.now());
        time.advance(Duration::from_millis(250));
        assert_eq!(Duration::from_millis(1250), clock.now());

        // Resuming a running clock changes nothing.
        clock.resume();
        assert_eq!(Duration::from_millis(1250), clock.now());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = PlaybackClock::system();
        let first = clock.now();
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.now() > first);
    }
}
