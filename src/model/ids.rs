use snafu::Snafu;

use super::*;
use crate::macros::define_id;

define_id!(LessonId);
define_id!(ModuleId);
define_id!(
    /// Identifier of an uploaded or linked course file.
    FileId
);
define_id!(MaterialId);
define_id!(UserId);
define_id!(PurchaseId);

#[derive(Debug, Clone, PartialEq, Eq, Snafu, new)]
#[snafu(display("cannot parse `{text}` as {kind}"))]
pub struct ParseId {
    pub kind: &'static str,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lesson_id() {
        let id: LessonId = " 42 ".parse().unwrap();
        assert_eq!(id, LessonId(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn reject_non_numeric_id() {
        let error = "abc".parse::<ModuleId>().unwrap_err();
        assert_eq!(error.kind, "ModuleId");
        assert_eq!(error.to_string(), "cannot parse `abc` as ModuleId");
    }

    #[test]
    fn ids_are_plain_numbers_on_the_wire() {
        let json = serde_json::to_string(&LessonId(7)).unwrap();
        assert_eq!(json, "7");
    }
}
