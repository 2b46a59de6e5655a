use serde_with::{serde_as, DefaultOnNull};

use super::*;

/// A downloadable attachment listed next to a lesson or module.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Material {
    pub id: MaterialId,
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub file_url: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub file_type: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub progress: Progress,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub files: Vec<CourseFile>,
}

impl Lesson {
    pub fn is_completed(&self) -> bool {
        self.progress.completed
    }

    pub fn duration_seconds(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    /// Watched share of the nominal duration, clamped to `[0, 1]`.
    pub fn watch_fraction(&self) -> f64 {
        let total = self.duration_seconds();
        if total == 0 {
            return 0.0;
        }

        (self.progress.watch_time_seconds as f64 / total as f64).min(1.0)
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub description: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub files: Vec<CourseFile>,
}

impl Module {
    pub fn completed_lessons(&self) -> usize {
        self.lessons.iter().filter(|lesson| lesson.is_completed()).count()
    }

    pub fn progress(&self) -> f64 {
        percent(self.completed_lessons(), self.lessons.len())
    }
}

/// The module → lesson → progress tree of one learner.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Course {
    pub modules: Vec<Module>,
}

impl Course {
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|module| module.lessons.iter())
    }

    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons().find(|lesson| lesson.id == id)
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|module| module.lessons.len()).sum()
    }

    pub fn completed_count(&self) -> usize {
        self.modules.iter().map(Module::completed_lessons).sum()
    }

    pub fn progress(&self) -> f64 {
        percent(self.completed_count(), self.lesson_count())
    }
}
