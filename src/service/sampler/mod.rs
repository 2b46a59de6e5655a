use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::select;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::instrument;

use crate::model::{whole_seconds, CompletionThreshold, LessonId, PlaybackSample, ProgressUpdate};
use crate::service::reporter::ProgressReporter;

mod task;

use task::SamplingTask;

/// Read side of a video player, the sampler's view of a video element.
pub trait Player: Send + Sync + 'static {
    /// Current playback position in seconds.
    fn position(&self) -> f64;

    /// Total length in seconds. `NaN` until the media metadata is known.
    fn duration(&self) -> f64;

    fn is_paused(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Play,
    Pause,
    Ended,
}

struct Binding {
    player: Arc<dyn Player>,
    timer: Option<SamplingTask>,
}

impl Binding {
    fn stop_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(task) => {
                task.quit();
                true
            }
            None => false,
        }
    }
}

type Bindings = Arc<DashMap<LessonId, Binding>>;

/// Samples the players of the lessons on screen and forwards their progress.
///
/// All timers belong to this instance: dropping it (or calling [PlaybackSampler::release]) stops
/// every one of them.
pub struct PlaybackSampler {
    bindings: Bindings,
    reporter: ProgressReporter,
    period: Duration,
    threshold: CompletionThreshold,
    generation: AtomicU64,
}

impl std::fmt::Debug for PlaybackSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSampler")
            .field("lessons", &self.bindings.len())
            .field("active_timers", &self.active_timers())
            .field("period", &self.period)
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl PlaybackSampler {
    pub fn new(reporter: ProgressReporter, period: Duration, threshold: CompletionThreshold) -> Self {
        Self {
            bindings: Arc::default(),
            reporter,
            period,
            threshold,
            generation: AtomicU64::new(0),
        }
    }

    /// Binds `player` to the lesson, replacing (and silencing) any previous binding.
    #[instrument(skip(self, player))]
    pub fn attach(&self, lesson_id: LessonId, player: Arc<dyn Player>) {
        let binding = Binding {
            player,
            timer: None,
        };

        if let Some(mut previous) = self.bindings.insert(lesson_id, binding) {
            if previous.stop_timer() {
                tracing::debug!(lesson.id = %lesson_id, "stopped the timer of the replaced binding");
            }
        }
    }

    #[instrument(skip(self))]
    pub fn detach(&self, lesson_id: LessonId) {
        if let Some((_, mut binding)) = self.bindings.remove(&lesson_id) {
            binding.stop_timer();
        }
    }

    pub fn handle(&self, lesson_id: LessonId, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Play => self.play(lesson_id),
            PlaybackEvent::Pause => self.pause(lesson_id),
            PlaybackEvent::Ended => self.ended(lesson_id),
        }
    }

    /// Starts sampling every period, replacing a timer that is already running for the lesson.
    #[instrument(skip(self))]
    pub fn play(&self, lesson_id: LessonId) {
        let Some(player) = self.bindings.get(&lesson_id).map(|binding| binding.player.clone()) else {
            tracing::warn!(lesson.id = %lesson_id, "play event for a lesson without a player");
            return;
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let sampled = player.clone();
        let bindings = self.bindings.clone();
        let reporter = self.reporter.clone();
        let period = self.period;
        let threshold = self.threshold;

        let task = SamplingTask::spawn(generation, |mut quit| async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                select! {
                    biased;

                    _ = &mut quit => break,

                    _ = interval.tick() => {
                        if player.is_paused() {
                            continue;
                        }

                        let sample = PlaybackSample::new(lesson_id, player.position(), player.duration(), true);
                        let update = sample.to_update(threshold);

                        if update.completed {
                            tracing::info!(lesson.id = %lesson_id, watched = update.watch_time_seconds, "lesson watched past the completion threshold");
                            clear_own_timer(&bindings, lesson_id, generation);
                            reporter.report(update);
                            break;
                        }

                        reporter.report(update);
                    }
                }
            }
        });

        // the map is not locked while spawning; the binding may have changed since
        match self.bindings.get_mut(&lesson_id) {
            Some(mut binding) if Arc::ptr_eq(&binding.player, &sampled) => {
                binding.stop_timer();
                binding.timer = Some(task);
                tracing::debug!(lesson.id = %lesson_id, period = ?self.period, "started sampling");
            }
            _ => {
                task.quit();
                tracing::debug!(lesson.id = %lesson_id, "player replaced before sampling started");
            }
        }
    }

    /// Stops sampling and reports the paused position as a checkpoint.
    #[instrument(skip(self))]
    pub fn pause(&self, lesson_id: LessonId) {
        let Some(player) = self.stop(lesson_id) else {
            tracing::warn!(lesson.id = %lesson_id, "pause event for a lesson without a player");
            return;
        };

        let sample = PlaybackSample::new(lesson_id, player.position(), player.duration(), false);
        self.reporter.report(sample.to_update(self.threshold));
    }

    /// Stops sampling and reports the lesson as completed, whatever the threshold says.
    #[instrument(skip(self))]
    pub fn ended(&self, lesson_id: LessonId) {
        let Some(player) = self.stop(lesson_id) else {
            tracing::warn!(lesson.id = %lesson_id, "ended event for a lesson without a player");
            return;
        };

        let update = ProgressUpdate::new(lesson_id, true, whole_seconds(player.duration()));
        self.reporter.report(update);
    }

    /// Stops every outstanding timer. Bindings stay, so playback can resume later.
    pub fn release(&self) {
        let mut stopped = 0;
        for mut binding in self.bindings.iter_mut() {
            if binding.stop_timer() {
                stopped += 1;
            }
        }

        if stopped > 0 {
            tracing::debug!(stopped, "released sampling timers");
        }
    }

    pub fn active_timers(&self) -> usize {
        self.bindings
            .iter()
            .filter(|binding| binding.timer.as_ref().is_some_and(|task| !task.is_finished()))
            .count()
    }

    pub fn is_sampling(&self, lesson_id: LessonId) -> bool {
        self.bindings
            .get(&lesson_id)
            .is_some_and(|binding| binding.timer.as_ref().is_some_and(|task| !task.is_finished()))
    }

    pub fn is_attached(&self, lesson_id: LessonId) -> bool {
        self.bindings.contains_key(&lesson_id)
    }

    fn stop(&self, lesson_id: LessonId) -> Option<Arc<dyn Player>> {
        let mut binding = self.bindings.get_mut(&lesson_id)?;
        binding.stop_timer();
        Some(binding.player.clone())
    }
}

impl Drop for PlaybackSampler {
    fn drop(&mut self) {
        self.release();
    }
}

/// Forget the timer of `generation` unless a newer one already took its place.
fn clear_own_timer(bindings: &Bindings, lesson_id: LessonId, generation: u64) {
    if let Some(mut binding) = bindings.get_mut(&lesson_id) {
        if binding.timer.as_ref().is_some_and(|task| task.generation == generation) {
            binding.timer = None;
        }
    }
}
