use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::service::sampler::Player;

/// A stand-in for a video element: its position advances with the wall clock while playing.
#[derive(Debug)]
pub struct SimulatedPlayer {
    duration: f64,
    clock: Mutex<Clock>,
}

#[derive(Debug, Default)]
struct Clock {
    offset: f64,
    playing_since: Option<Instant>,
}

impl SimulatedPlayer {
    /// A lesson without a nominal length behaves like media whose metadata never loaded.
    pub fn new(duration_seconds: u64) -> Self {
        let duration = if duration_seconds == 0 {
            f64::NAN
        } else {
            duration_seconds as f64
        };

        Self {
            duration,
            clock: Mutex::default(),
        }
    }

    pub fn play(&self) {
        let mut clock = self.clock();
        if clock.playing_since.is_none() {
            clock.playing_since = Some(Instant::now());
        }
    }

    pub fn pause(&self) {
        let position = self.position();
        let mut clock = self.clock();
        clock.offset = position;
        clock.playing_since = None;
    }

    pub fn seek(&self, position: f64) {
        let position = self.clamp(position.max(0.0));
        let mut clock = self.clock();
        clock.offset = position;
        if clock.playing_since.is_some() {
            clock.playing_since = Some(Instant::now());
        }
    }

    /// Jumps to the end and stops, as a video does when it runs out.
    pub fn finish(&self) {
        let mut clock = self.clock();
        if self.duration.is_finite() {
            clock.offset = self.duration;
        }
        clock.playing_since = None;
    }

    fn clock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clamp(&self, position: f64) -> f64 {
        if self.duration.is_finite() {
            position.min(self.duration)
        } else {
            position
        }
    }
}

impl Player for SimulatedPlayer {
    fn position(&self) -> f64 {
        let clock = self.clock();
        let elapsed = clock
            .playing_since
            .map_or(0.0, |since| since.elapsed().as_secs_f64());

        self.clamp(clock.offset + elapsed)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    /// Running out of media does not pause; the position just stops at the end.
    fn is_paused(&self) -> bool {
        self.clock().playing_since.is_none()
    }
}
