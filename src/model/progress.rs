use serde_with::{serde_as, DefaultOnNull};
use snafu::Snafu;

use super::*;

/// Per-learner completion state of one lesson, as returned inside the course tree.
#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Progress {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub completed: bool,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub watch_time_seconds: u64,
}

/// Body of a `POST` to the course-progress endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct ProgressUpdate {
    pub lesson_id: LessonId,
    pub completed: bool,
    pub watch_time_seconds: u64,
}

impl ProgressUpdate {
    /// The explicit "mark as done" update, sent independently of any playback.
    pub fn mark_complete(lesson_id: LessonId) -> Self {
        Self::new(lesson_id, true, 0)
    }
}

/// One observation of a player, taken on a sampling tick or a pause.
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct PlaybackSample {
    pub lesson_id: LessonId,
    pub position: f64,
    pub duration: f64,
    pub is_playing: bool,
}

impl PlaybackSample {
    pub fn is_complete(&self, threshold: CompletionThreshold) -> bool {
        threshold.is_reached(self.position, self.duration)
    }

    pub fn to_update(&self, threshold: CompletionThreshold) -> ProgressUpdate {
        ProgressUpdate::new(
            self.lesson_id,
            self.is_complete(threshold),
            whole_seconds(self.position),
        )
    }
}

/// Floor of a player clock reading. Readings that are not a positive finite number count as zero.
pub fn whole_seconds(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

/// Watched fraction of a lesson's duration at which it counts as completed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct CompletionThreshold(f64);

impl CompletionThreshold {
    pub const DEFAULT: CompletionThreshold = CompletionThreshold(0.9);

    pub fn new(fraction: f64) -> Result<Self, InvalidThreshold> {
        if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
            Ok(Self(fraction))
        } else {
            InvalidThresholdSnafu { fraction }.fail()
        }
    }

    pub fn fraction(self) -> f64 {
        self.0
    }

    /// An unknown duration (`NaN`, infinite, zero or negative) never reaches the threshold.
    pub fn is_reached(self, position: f64, duration: f64) -> bool {
        if !duration.is_finite() || duration <= 0.0 {
            return false;
        }

        position >= duration * self.0
    }
}

impl Default for CompletionThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for CompletionThreshold {
    type Error = InvalidThreshold;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompletionThreshold> for f64 {
    fn from(value: CompletionThreshold) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("completion threshold must be within (0, 1], got {fraction}"))]
pub struct InvalidThreshold {
    pub fraction: f64,
}

/// `part / whole` as a percentage, `0` when there is nothing to count.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }

    part as f64 / whole as f64 * 100.0
}
