use crate::subject::{Subject, SubjectId};
use serde::Serialize;
use std::iter::successors;
use time::{
    format_description::BorrowedFormatItem,
    macros::{format_description, time},
    Date, OffsetDateTime, PrimitiveDateTime, Time,
    Weekday::{self, *},
};
use tracing::debug;

static STAMP_FMT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

pub(crate) const DEFAULT_START_TIME: Time = time!(09:00);

pub(crate) const DEFAULT_END_TIME: Time = time!(10:00);

/// Color given to classes whose subject doesn't specify one
pub(crate) const DEFAULT_COLOR: &str = "#3788d8";

/// A closed interval of calendar dates.  A range whose end precedes its start
/// is valid but contains no dates.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct DateRange {
    pub(crate) start: Date,
    pub(crate) end: Date,
}

impl DateRange {
    pub(crate) fn new(start: Date, end: Date) -> DateRange {
        DateRange { start, end }
    }

    /// Returns the month containing `date`, widened so that it starts on a
    /// Sunday and ends on a Saturday
    pub(crate) fn month_weeks(date: Date) -> DateRange {
        let first = date
            .replace_day(1)
            .expect("every month should have a first day");
        let last = date
            .replace_day(date.month().length(date.year()))
            .expect("every month should have a last day");
        let start = iter_days_before(first)
            .take(usize::from(first.weekday().number_days_from_sunday()))
            .last()
            .unwrap_or(first);
        let end = iter_days_after(last)
            .take(usize::from(6 - last.weekday().number_days_from_sunday()))
            .last()
            .unwrap_or(last);
        DateRange { start, end }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub(crate) fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates over every date in the range in ascending order
    pub(crate) fn days(&self) -> impl Iterator<Item = Date> {
        let end = self.end;
        successors(
            Some(self.start).filter(|_| !self.is_empty()),
            move |d| d.next_day().filter(|&next| next <= end),
        )
    }
}

/// A set of weekdays on which a weekly class takes place
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct WeekdaySet(u8);

impl WeekdaySet {
    /// Builds the set from backend weekday tokens (`"monday"` … `"sunday"`).
    /// Tokens outside that vocabulary are skipped.
    pub(crate) fn from_tokens<I, S>(tokens: I) -> WeekdaySet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = WeekdaySet::default();
        for token in tokens {
            let token = token.as_ref();
            match weekday_from_token(token) {
                Some(wd) => set.insert(wd),
                None => debug!(token, "ignoring unrecognized weekday token"),
            }
        }
        set
    }

    pub(crate) fn insert(&mut self, wd: Weekday) {
        self.0 |= bit(wd);
    }

    pub(crate) fn contains(self, wd: Weekday) -> bool {
        self.0 & bit(wd) != 0
    }

    pub(crate) fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The dates of a weekly rule on these weekdays, bounded by `range`
    pub(crate) fn dates_in(self, range: DateRange) -> impl Iterator<Item = Date> {
        range.days().filter(move |d| self.contains(d.weekday()))
    }
}

fn bit(wd: Weekday) -> u8 {
    1 << wd.number_days_from_monday()
}

fn weekday_from_token(token: &str) -> Option<Weekday> {
    match token.trim().to_ascii_lowercase().as_str() {
        "monday" => Some(Monday),
        "tuesday" => Some(Tuesday),
        "wednesday" => Some(Wednesday),
        "thursday" => Some(Thursday),
        "friday" => Some(Friday),
        "saturday" => Some(Saturday),
        "sunday" => Some(Sunday),
        _ => None,
    }
}

/// One dated occurrence of a subject's weekly class
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarEvent {
    pub(crate) id: String,
    pub(crate) title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) end: OffsetDateTime,
    pub(crate) all_day: bool,
    #[serde(rename = "extendedProps")]
    pub(crate) meta: EventMeta,
}

impl CalendarEvent {
    pub(crate) fn date(&self) -> Date {
        self.start.date()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventMeta {
    #[serde(rename = "type")]
    pub(crate) kind: EventKind,
    pub(crate) color: String,
    pub(crate) subject_id: SubjectId,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EventKind {
    Class,
}

/// Lazily expands the weekly schedules of `subjects` into one event per
/// (subject, matching date) within `range`.
///
/// Occurrence times are pinned to UTC wall-clock, so every occurrence of a
/// subject starts and ends at the same time of day regardless of DST in the
/// viewer's zone.  Subjects without any recognized weekday produce nothing.
/// Events of one subject come out in date order; events of different
/// subjects are not interleaved.
pub(crate) fn expand(
    subjects: &[Subject],
    range: DateRange,
) -> impl Iterator<Item = CalendarEvent> + '_ {
    subjects.iter().flat_map(move |subject| {
        let by_day = WeekdaySet::from_tokens(&subject.days);
        let dates = if by_day.is_empty() {
            debug!(subject = %subject.id, "subject has no class days, skipping");
            None
        } else {
            Some(by_day.dates_in(range))
        };
        let start_time = subject.start_time.unwrap_or(DEFAULT_START_TIME);
        let end_time = subject.end_time.unwrap_or(DEFAULT_END_TIME);
        dates
            .into_iter()
            .flatten()
            .map(move |date| occurrence(subject, date, start_time, end_time))
    })
}

fn occurrence(subject: &Subject, date: Date, start_time: Time, end_time: Time) -> CalendarEvent {
    let start = PrimitiveDateTime::new(date, start_time).assume_utc();
    let end = PrimitiveDateTime::new(date, end_time).assume_utc();
    CalendarEvent {
        id: format!("{}-{}", subject.id, iso_stamp(start)),
        title: subject.name.clone(),
        start,
        end,
        all_day: false,
        meta: EventMeta {
            kind: EventKind::Class,
            color: subject
                .color
                .clone()
                .unwrap_or_else(|| String::from(DEFAULT_COLOR)),
            subject_id: subject.id.clone(),
        },
    }
}

// `YYYY-MM-DDTHH:MM:SSZ`; sub-second precision never occurs in class times
fn iso_stamp(dt: OffsetDateTime) -> String {
    dt.format(&STAMP_FMT)
        .expect("formatting a UTC date-time as a stamp should not fail")
}

pub(crate) fn iter_days_after(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day()).skip(1)
}

pub(crate) fn iter_days_before(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.previous_day()).skip(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use time::macros::date;

    fn subject(id: i64, name: &str, days: &[&str]) -> Subject {
        Subject {
            id: SubjectId::Number(id),
            name: String::from(name),
            days: days.iter().map(|&d| String::from(d)).collect(),
            start_time: None,
            end_time: None,
            color: None,
        }
    }

    fn math() -> Subject {
        Subject {
            start_time: Some(time!(09:00)),
            end_time: Some(time!(10:00)),
            ..subject(1, "Math", &["monday", "wednesday"])
        }
    }

    fn june_week() -> DateRange {
        DateRange::new(date!(2024 - 06 - 03), date!(2024 - 06 - 09))
    }

    #[test]
    fn test_math_week() {
        let events = expand(&[math()], june_week()).collect::<Vec<_>>();
        let spans = events
            .iter()
            .map(|e| (e.id.as_str(), e.start, e.end))
            .collect::<Vec<_>>();
        assert_eq!(
            spans,
            [
                (
                    "1-2024-06-03T09:00:00Z",
                    date!(2024 - 06 - 03).with_time(time!(09:00)).assume_utc(),
                    date!(2024 - 06 - 03).with_time(time!(10:00)).assume_utc(),
                ),
                (
                    "1-2024-06-05T09:00:00Z",
                    date!(2024 - 06 - 05).with_time(time!(09:00)).assume_utc(),
                    date!(2024 - 06 - 05).with_time(time!(10:00)).assume_utc(),
                ),
            ]
        );
        let first = &events[0];
        assert_eq!(first.title, "Math");
        assert!(!first.all_day);
        assert_eq!(first.meta.kind, EventKind::Class);
        assert_eq!(first.meta.color, DEFAULT_COLOR);
        assert_eq!(first.meta.subject_id, SubjectId::Number(1));
    }

    #[test]
    fn test_deterministic() {
        let subjects = [
            math(),
            subject(2, "Chemistry", &["tuesday", "friday"]),
            subject(3, "Drama", &["saturday"]),
        ];
        let range = DateRange::new(date!(2024 - 05 - 26), date!(2024 - 07 - 06));
        let a = expand(&subjects, range).collect::<Vec<_>>();
        let b = expand(&subjects, range).collect::<Vec<_>>();
        assert_eq!(a, b);
        let ids = a.iter().map(|e| e.id.as_str()).collect::<BTreeSet<_>>();
        assert_eq!(ids.len(), a.len(), "event ids should be unique");
    }

    #[test]
    fn test_events_within_range_and_on_scheduled_days() {
        let subjects = [
            math(),
            subject(2, "Chemistry", &["tuesday", "friday", "sunday"]),
        ];
        let range = DateRange::new(date!(2024 - 02 - 20), date!(2024 - 03 - 13));
        let events = expand(&subjects, range).collect::<Vec<_>>();
        assert!(!events.is_empty());
        for e in &events {
            assert!(range.contains(e.date()), "{} outside range", e.id);
            let owner = subjects
                .iter()
                .find(|s| s.id == e.meta.subject_id)
                .expect("event should belong to a subject");
            assert!(
                WeekdaySet::from_tokens(&owner.days).contains(e.date().weekday()),
                "{} on unscheduled weekday",
                e.id
            );
        }
    }

    #[test]
    fn test_subject_without_days_is_skipped() {
        let subjects = [
            subject(1, "Empty", &[]),
            subject(2, "Garbage", &["lundi", "", "mon"]),
        ];
        assert_eq!(expand(&subjects, june_week()).count(), 0);
    }

    #[test]
    fn test_unrecognized_tokens_dropped() {
        let subjects = [subject(1, "Mixed", &["funday", "thursday"])];
        let events = expand(&subjects, june_week()).collect::<Vec<_>>();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date(), date!(2024 - 06 - 06));
    }

    #[test]
    fn test_tokens_are_trimmed_and_case_insensitive() {
        let set = WeekdaySet::from_tokens(["Monday", " FRIDAY "]);
        assert!(set.contains(Monday));
        assert!(set.contains(Friday));
        assert!(!set.contains(Sunday));
    }

    #[test]
    fn test_no_subjects() {
        assert_eq!(expand(&[], june_week()).count(), 0);
    }

    #[test]
    fn test_inverted_range() {
        let range = DateRange::new(date!(2024 - 06 - 09), date!(2024 - 06 - 03));
        assert!(range.is_empty());
        assert_eq!(range.days().count(), 0);
        assert_eq!(expand(&[math()], range).count(), 0);
    }

    #[test]
    fn test_single_day_range() {
        let monday = DateRange::new(date!(2024 - 06 - 03), date!(2024 - 06 - 03));
        assert_eq!(expand(&[math()], monday).count(), 1);
        let tuesday = DateRange::new(date!(2024 - 06 - 04), date!(2024 - 06 - 04));
        assert_eq!(expand(&[math()], tuesday).count(), 0);
    }

    #[test]
    fn test_count_whole_weeks() {
        let subjects = [subject(1, "Latin", &["monday"])];
        let range = DateRange::new(date!(2024 - 06 - 03), date!(2024 - 06 - 30));
        assert_eq!(expand(&subjects, range).count(), 4);
    }

    #[test]
    fn test_count_partial_week() {
        let subjects = [subject(1, "Latin", &["monday"])];
        let range = DateRange::new(date!(2024 - 06 - 03), date!(2024 - 07 - 01));
        assert_eq!(expand(&subjects, range).count(), 5);
        let range = DateRange::new(date!(2024 - 06 - 04), date!(2024 - 07 - 01));
        assert_eq!(expand(&subjects, range).count(), 4);
    }

    #[test]
    fn test_same_time_of_day_across_dst() {
        let subjects = [Subject {
            start_time: Some(time!(09:00)),
            end_time: Some(time!(10:30)),
            ..subject(5, "Biology", &["sunday"])
        }];
        // Spans the March and October DST switches in both hemispheres
        let range = DateRange::new(date!(2024 - 03 - 01), date!(2024 - 11 - 30));
        let events = expand(&subjects, range).collect::<Vec<_>>();
        assert_eq!(events.len(), 39);
        for e in &events {
            assert_eq!(e.start.time(), time!(09:00));
            assert_eq!(e.end.time(), time!(10:30));
            assert_eq!(e.start.date(), e.end.date());
        }
    }

    #[test]
    fn test_default_times() {
        let events = expand(&[subject(1, "Art", &["friday"])], june_week()).collect::<Vec<_>>();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start.time(), DEFAULT_START_TIME);
        assert_eq!(events[0].end.time(), DEFAULT_END_TIME);
    }

    #[test]
    fn test_end_before_start_is_kept() {
        let subjects = [Subject {
            start_time: Some(time!(14:00)),
            end_time: Some(time!(13:00)),
            ..subject(1, "Odd", &["monday"])
        }];
        let events = expand(&subjects, june_week()).collect::<Vec<_>>();
        assert_eq!(events.len(), 1);
        assert!(events[0].end < events[0].start);
    }

    #[test]
    fn test_text_ids() {
        let subjects = [Subject {
            id: SubjectId::Text(String::from("geo-7")),
            color: Some(String::from("#00ff00")),
            ..subject(0, "Geography", &["sunday"])
        }];
        let events = expand(&subjects, june_week()).collect::<Vec<_>>();
        assert_eq!(events[0].id, "geo-7-2024-06-09T09:00:00Z");
        assert_eq!(events[0].meta.color, "#00ff00");
    }

    #[test]
    fn test_json_shape() {
        let event = expand(&[math()], june_week()).next().unwrap();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "1-2024-06-03T09:00:00Z",
                "title": "Math",
                "start": "2024-06-03T09:00:00Z",
                "end": "2024-06-03T10:00:00Z",
                "allDay": false,
                "extendedProps": {
                    "type": "class",
                    "color": "#3788d8",
                    "subjectId": 1,
                },
            })
        );
    }

    #[test]
    fn test_month_weeks() {
        // June 2024 starts on a Saturday and ends on a Sunday
        assert_eq!(
            DateRange::month_weeks(date!(2024 - 06 - 17)),
            DateRange::new(date!(2024 - 05 - 26), date!(2024 - 07 - 06))
        );
        // September 2024 starts on a Sunday and ends on a Monday
        assert_eq!(
            DateRange::month_weeks(date!(2024 - 09 - 01)),
            DateRange::new(date!(2024 - 09 - 01), date!(2024 - 10 - 05))
        );
        // August 2024 ends on a Saturday
        assert_eq!(
            DateRange::month_weeks(date!(2024 - 08 - 31)),
            DateRange::new(date!(2024 - 07 - 28), date!(2024 - 08 - 31))
        );
    }

    #[test]
    fn test_month_weeks_is_week_aligned() {
        let mut date = date!(2023 - 01 - 15);
        for _ in 0..24 {
            let range = DateRange::month_weeks(date);
            assert_eq!(range.start.weekday(), Sunday);
            assert_eq!(range.end.weekday(), Saturday);
            assert_eq!(range.days().count() % 7, 0);
            assert!(range.contains(date));
            date = iter_days_after(date).nth(30).unwrap();
        }
    }

    #[test]
    fn test_month_weeks_leap_february() {
        assert_eq!(
            DateRange::month_weeks(date!(2024 - 02 - 10)),
            DateRange::new(date!(2024 - 01 - 28), date!(2024 - 03 - 02))
        );
        assert_eq!(
            DateRange::month_weeks(date!(2023 - 02 - 10)),
            DateRange::new(date!(2023 - 01 - 29), date!(2023 - 03 - 04))
        );
    }

    #[test]
    fn test_stamp_pads_fields() {
        let subjects = [Subject {
            start_time: Some(time!(07:05:09)),
            ..subject(12, "Chess", &["sunday"])
        }];
        let day = date!(987 - 01 - 07);
        let ids = expand(&subjects, DateRange::new(day, day))
            .map(|e| e.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, ["12-0987-01-07T07:05:09Z"]);
    }
}
