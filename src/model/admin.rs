use serde_with::{serde_as, DefaultOnNull};

use super::*;

/// A module as the admin service lists and accepts it. `id` is absent on creation.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct ModuleRecord {
    #[new(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ModuleId>,
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub description: String,
    #[new(default)]
    #[serde(default)]
    pub sort_order: i32,
    #[new(default)]
    #[serde(default)]
    pub is_published: bool,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct LessonRecord {
    #[new(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LessonId>,
    pub module_id: ModuleId,
    pub title: String,
    #[new(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub description: String,
    #[new(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub video_url: String,
    #[new(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub duration_minutes: u32,
    #[new(default)]
    #[serde(default)]
    pub sort_order: i32,
    #[new(default)]
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct MaterialRecord {
    #[new(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MaterialId>,
    #[new(default)]
    #[serde(default)]
    pub lesson_id: Option<LessonId>,
    #[new(default)]
    #[serde(default)]
    pub module_id: Option<ModuleId>,
    pub title: String,
    pub file_url: String,
    pub file_type: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn new_module_has_no_id_on_the_wire() {
        let record = ModuleRecord::new("Basics".to_string(), String::new());
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"title": "Basics", "description": "", "sort_order": 0, "is_published": false})
        );
    }

    #[test]
    fn listed_lesson_keeps_its_id() {
        let record: LessonRecord = serde_json::from_value(json!({
            "id": 3,
            "module_id": 1,
            "title": "Intro",
            "description": null,
            "video_url": "https://cdn.example/intro.mp4",
            "duration_minutes": 12,
            "sort_order": 1,
            "is_published": true
        }))
        .unwrap();

        assert_eq!(record.id, Some(LessonId(3)));
        assert_eq!(record.description, "");
    }
}
