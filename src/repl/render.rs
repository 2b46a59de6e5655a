use std::fmt::Write as _;

use crate::model::{Course, CourseFile, Lesson};
use crate::service::dashboard::{DashboardView, LoadFailure};

pub fn view(view: &DashboardView) -> String {
    match view {
        DashboardView::Loading => "loading the course…".to_string(),
        DashboardView::Error(LoadFailure::NoAccess {
            message,
            purchase_url,
        }) => format!("no access to the course: {message}\n  buy it at {purchase_url}"),
        DashboardView::Error(LoadFailure::Unavailable { message }) => {
            format!("could not load the course: {message}")
        }
        DashboardView::Ready(course) => course_tree(course),
    }
}

fn course_tree(course: &Course) -> String {
    let mut out = format!(
        "progress {:.0}% ({}/{} lessons)",
        course.progress(),
        course.completed_count(),
        course.lesson_count()
    );

    for module in &course.modules {
        let _ = write!(out, "\n  module {} {} {:.0}%", module.id, module.title, module.progress());
        for lesson in &module.lessons {
            let _ = write!(out, "\n    {}", lesson_line(lesson));
        }
    }

    out
}

fn lesson_line(lesson: &Lesson) -> String {
    let mark = if lesson.is_completed() { "x" } else { " " };
    let video = if lesson.video_url.is_some() { "" } else { ", no video" };

    format!(
        "[{mark}] {} {} ({} min, watched {:.0}%{video})",
        lesson.id,
        lesson.title,
        lesson.duration_minutes,
        lesson.watch_fraction() * 100.0
    )
}

pub fn files(files: &[CourseFile]) -> String {
    if files.is_empty() {
        return "no course files".to_string();
    }

    files
        .iter()
        .map(|file| {
            let welcome = if file.is_welcome_video { " (welcome video)" } else { "" };
            let location = file.file_url.as_deref().unwrap_or("-");
            format!("  file {} {}{welcome}: {location}", file.id, file.title)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::model::fixtures::course;

    #[test]
    fn ready_tree() {
        let text = view(&DashboardView::Ready(course()));

        assert!(text.starts_with("progress 33% (1/3 lessons)"), "{text}");
        assert!(text.contains("module 1 Basics 50%"), "{text}");
        assert!(text.contains("[x] 10 Intro (10 min, watched 100%)"), "{text}");
        assert!(text.contains("[ ] 11 Paperwork (20 min, watched 25%, no video)"), "{text}");
    }

    #[test]
    fn access_denied_shows_purchase_page() {
        let text = view(&DashboardView::Error(LoadFailure::NoAccess {
            message: "Course not purchased".to_string(),
            purchase_url: Url::parse("https://school.example/buy").unwrap(),
        }));

        assert_eq!(
            text,
            "no access to the course: Course not purchased\n  buy it at https://school.example/buy"
        );
    }
}
