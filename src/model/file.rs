use serde_with::{serde_as, DefaultOnNull};

use super::*;

/// A course attachment held by the upload service: either stored content or an external link.
///
/// Listings from the upload service use camelCase keys while the course tree uses snake_case,
/// so both spellings are accepted.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CourseFile {
    pub id: FileId,
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "fileName")]
    pub file_name: Option<String>,
    #[serde(default, alias = "fileUrl", alias = "url")]
    pub file_url: Option<String>,
    #[serde(default, alias = "fileType")]
    pub file_type: Option<String>,
    #[serde(default, alias = "fileSize")]
    pub file_size: Option<u64>,
    #[serde(default, alias = "uploadedAt")]
    pub uploaded_at: Option<Timestamp>,
    #[serde(default, alias = "moduleId")]
    pub module_id: Option<ModuleId>,
    #[serde(default, alias = "lessonId")]
    pub lesson_id: Option<LessonId>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default, alias = "isWelcomeVideo")]
    pub is_welcome_video: bool,
}

impl CourseFile {
    pub fn is_video(&self) -> bool {
        self.file_type
            .as_deref()
            .is_some_and(|file_type| file_type.starts_with("video/"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_upload_listing_entry() {
        let file: CourseFile = serde_json::from_value(json!({
            "id": 3,
            "title": "Welcome",
            "description": "",
            "fileName": "welcome.mp4",
            "fileUrl": "https://cdn.example/welcome.mp4",
            "fileType": "video/mp4",
            "fileSize": 1024,
            "uploadedAt": "2024-05-01T09:30:00",
            "isWelcomeVideo": true
        }))
        .unwrap();

        assert_eq!(file.file_name.as_deref(), Some("welcome.mp4"));
        assert!(file.is_welcome_video);
        assert!(file.is_video());
        assert_eq!(file.uploaded_at.unwrap().to_string(), "2024-05-01 09:30");
    }

    #[test]
    fn decode_tree_entry() {
        let file: CourseFile = serde_json::from_value(json!({
            "id": 4,
            "title": "Checklist",
            "description": null,
            "file_name": "checklist.pdf",
            "file_url": "https://cdn.example/checklist.pdf",
            "file_type": "application/pdf",
            "file_size": 2048,
            "module_id": 1,
            "is_welcome_video": null
        }))
        .unwrap();

        assert_eq!(file.module_id, Some(ModuleId(1)));
        assert!(!file.is_welcome_video);
        assert!(!file.is_video());
    }
}
