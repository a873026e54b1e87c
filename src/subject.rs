use serde::{Deserialize, Serialize};
use std::fmt;
use time::{format_description::BorrowedFormatItem, macros::format_description, Time};
use tracing::debug;

static HMS_FMT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]:[second]");

static HM_FMT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");

/// Identifier of a subject as stored by the backend.  Older exports use
/// integers, newer ones opaque strings, so both are accepted verbatim.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub(crate) enum SubjectId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Number(n) => write!(f, "{n}"),
            SubjectId::Text(s) => f.write_str(s),
        }
    }
}

/// A subject together with its weekly schedule.
///
/// `days` holds the weekday tokens exactly as the backend sent them; they are
/// only turned into weekday selectors when occurrences are expanded.  Times
/// that were absent or unparsable are `None` and fall back to the class
/// defaults at expansion time.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(from = "SubjectRecord")]
pub(crate) struct Subject {
    pub(crate) id: SubjectId,
    pub(crate) name: String,
    pub(crate) days: Vec<String>,
    pub(crate) start_time: Option<Time>,
    pub(crate) end_time: Option<Time>,
    pub(crate) color: Option<String>,
}

// Wire shape of a `/subjects` record.  Every field except `id` and `name` is
// optional or nullable on the backend.
#[derive(Clone, Debug, Deserialize)]
struct SubjectRecord {
    id: SubjectId,
    name: String,
    #[serde(default)]
    days: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

impl From<SubjectRecord> for Subject {
    fn from(record: SubjectRecord) -> Subject {
        let start_time = record
            .start_time
            .as_deref()
            .and_then(|s| time_field(&record.id, "start_time", s));
        let end_time = record
            .end_time
            .as_deref()
            .and_then(|s| time_field(&record.id, "end_time", s));
        let days = record
            .days
            .unwrap_or_default()
            .into_iter()
            .filter_map(|token| match token {
                serde_json::Value::String(s) => Some(s),
                other => {
                    debug!(
                        subject = %record.id,
                        token = %other,
                        "ignoring non-string weekday token"
                    );
                    None
                }
            })
            .collect();
        Subject {
            id: record.id,
            name: record.name,
            days,
            start_time,
            end_time,
            color: record.color.filter(|c| !c.trim().is_empty()),
        }
    }
}

fn time_field(id: &SubjectId, field: &str, value: &str) -> Option<Time> {
    let parsed = parse_time_of_day(value);
    if parsed.is_none() {
        debug!(subject = %id, field, value, "unparsable time of day, using default");
    }
    parsed
}

/// Parses a wall-clock time of day in `HH:MM:SS` or `HH:MM` form.
pub(crate) fn parse_time_of_day(s: &str) -> Option<Time> {
    let s = s.trim();
    Time::parse(s, &HMS_FMT)
        .or_else(|_| Time::parse(s, &HM_FMT))
        .ok()
}

// Paginated envelope of the `/subjects` endpoint
#[derive(Debug, Deserialize)]
struct SubjectsPage {
    results: Vec<Subject>,
}

/// Decodes a `/subjects` response body into subjects.  The body is either a
/// bare array of records or a paginated object with a `results` array.
pub(crate) fn decode_subjects(json: &str) -> Result<Vec<Subject>, serde_json::Error> {
    if json.trim_start().starts_with('[') {
        serde_json::from_str(json)
    } else {
        serde_json::from_str::<SubjectsPage>(json).map(|page| page.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use time::macros::time;

    #[test]
    fn test_decode_bare_list() {
        let subjects = decode_subjects(
            r##"[{"id": 1, "name": "Math", "days": ["monday", "wednesday"],
                 "start_time": "09:00:00", "end_time": "10:00:00", "color": "#ff0000"}]"##,
        )
        .unwrap();
        assert_eq!(
            subjects,
            [Subject {
                id: SubjectId::Number(1),
                name: String::from("Math"),
                days: vec![String::from("monday"), String::from("wednesday")],
                start_time: Some(time!(09:00)),
                end_time: Some(time!(10:00)),
                color: Some(String::from("#ff0000")),
            }]
        );
    }

    #[test]
    fn test_decode_paginated() {
        let subjects = decode_subjects(
            r#"{"count": 2, "next": null, "results": [
                {"id": "a1", "name": "History", "days": ["friday"]},
                {"id": "b2", "name": "Art"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].id, SubjectId::Text(String::from("a1")));
        assert_eq!(subjects[1].days, Vec::<String>::new());
    }

    #[test]
    fn test_decode_missing_optional_fields() {
        let subjects = decode_subjects(
            r#"[{"id": 7, "name": "PE", "days": null, "start_time": null, "color": ""}]"#,
        )
        .unwrap();
        let pe = &subjects[0];
        assert!(pe.days.is_empty());
        assert_eq!(pe.start_time, None);
        assert_eq!(pe.end_time, None);
        assert_eq!(pe.color, None);
    }

    #[test]
    fn test_decode_bad_time_is_dropped() {
        let subjects =
            decode_subjects(r#"[{"id": 3, "name": "Music", "start_time": "nine o'clock"}]"#)
                .unwrap();
        assert_eq!(subjects[0].start_time, None);
    }

    #[test]
    fn test_decode_rejects_missing_name() {
        assert!(decode_subjects(r#"[{"id": 3, "days": ["monday"]}]"#).is_err());
    }

    #[test]
    fn test_decode_rejects_non_list() {
        assert!(decode_subjects(r#"{"detail": "Not found."}"#).is_err());
    }

    #[test]
    fn test_decode_drops_non_string_days() {
        let subjects = decode_subjects(
            r#"[{"id": 1, "name": "Math", "days": ["monday"]},
                {"id": 2, "name": "Art", "days": ["friday", null, 3, {"day": "monday"}]}]"#,
        )
        .unwrap();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].days, ["monday"]);
        assert_eq!(subjects[1].days, ["friday"]);
    }

    #[test]
    fn test_decode_error_keeps_location() {
        let err = decode_subjects("[\n  {\"id\": 1, \"name\": \"Math\"},\n  {\"id\": 2}\n]")
            .unwrap_err();
        assert_eq!(err.line(), 3);
        assert!(err.to_string().contains("missing field `name`"));
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("09:00:00"), Some(time!(09:00)));
        assert_eq!(parse_time_of_day("10:30"), Some(time!(10:30)));
        assert_eq!(parse_time_of_day(" 13:45:15 "), Some(time!(13:45:15)));
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(parse_time_of_day(""), None);
    }

    #[test]
    fn test_subject_id_display() {
        assert_eq!(SubjectId::Number(42).to_string(), "42");
        assert_eq!(SubjectId::Text(String::from("abc")).to_string(), "abc");
    }
}
