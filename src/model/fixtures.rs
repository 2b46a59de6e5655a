use serde_json::json;

use super::Course;

/// Two modules, three lessons, one of them completed.
pub fn course_json() -> serde_json::Value {
    json!([
        {
            "id": 1,
            "title": "Basics",
            "description": null,
            "materials": [],
            "lessons": [
                {
                    "id": 10,
                    "title": "Intro",
                    "description": "",
                    "video_url": "https://cdn.example/intro.mp4",
                    "duration_minutes": 10,
                    "progress": {"completed": true, "watch_time_seconds": 600},
                    "materials": []
                },
                {
                    "id": 11,
                    "title": "Paperwork",
                    "description": "",
                    "video_url": null,
                    "duration_minutes": 20,
                    "progress": {"completed": false, "watch_time_seconds": 300},
                    "materials": null
                }
            ]
        },
        {
            "id": 2,
            "title": "Court",
            "description": "",
            "lessons": [
                {
                    "id": 20,
                    "title": "Hearing",
                    "duration_minutes": 0,
                    "progress": null
                }
            ]
        }
    ])
}

pub fn course() -> Course {
    serde_json::from_value(course_json()).expect("fixture course decodes")
}
