use crate::recurrence::{iter_days_after, iter_days_before};
use std::collections::VecDeque;
use std::iter::successors;
use std::num::NonZeroUsize;
use time::{Date, Month, Weekday, Weekday::*};

const DAYS_IN_WEEK: usize = 7;

pub(super) trait WeekdayExt {
    fn index0(&self) -> u16;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u16 {
        self.number_days_from_sunday().into()
    }
}

pub(super) fn is_last_day_of_month(date: Date) -> bool {
    match date.next_day() {
        Some(tomorrow) => date.month() != tomorrow.month(),
        None => true,
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
// Invariant: At least one element of the array is Some
pub(super) struct Week([Option<Date>; DAYS_IN_WEEK]);

impl Week {
    // Returns the Week containing the given date, which can be at any day of
    // the week
    pub(super) fn containing(date: Date) -> Week {
        let i = usize::from(date.weekday().index0());
        let mut week = Week([None; DAYS_IN_WEEK]);
        week.set(date);
        for d in iter_days_before(date).take(i) {
            week.set(d);
        }
        for d in iter_days_after(date).take(DAYS_IN_WEEK - i - 1) {
            week.set(d);
        }
        week
    }

    fn set(&mut self, date: Date) {
        let i = usize::from(date.weekday().index0());
        assert!(i < DAYS_IN_WEEK);
        self.0[i] = Some(date);
    }

    pub(super) fn enumerate(&self) -> EnumerateWeek<'_> {
        EnumerateWeek::new(self)
    }

    pub(super) fn get(&self, wd: Weekday) -> Option<Date> {
        self.0.get(usize::from(wd.index0())).copied().flatten()
    }

    pub(super) fn first_day(&self) -> Date {
        self.0
            .iter()
            .flatten()
            .copied()
            .next()
            .expect("Week should contain at least one Some")
    }

    pub(super) fn last_day(&self) -> Date {
        self.0
            .iter()
            .flatten()
            .copied()
            .last()
            .expect("Week should contain at least one Some")
    }

    pub(super) fn contains(&self, date: Date) -> bool {
        self.get(date.weekday()) == Some(date)
    }

    pub(super) fn has_month_start(&self) -> bool {
        self.0.iter().flatten().any(|d| d.day() == 1)
    }

    pub(super) fn first_ym(&self) -> (i32, Month) {
        let d = self.first_day();
        (d.year(), d.month())
    }

    pub(super) fn last_ym(&self) -> (i32, Month) {
        let d = self.last_day();
        (d.year(), d.month())
    }

    pub(super) fn previous(&self) -> Option<Week> {
        self.get(Sunday)
            .and_then(Date::previous_day)
            .map(Week::containing)
    }

    pub(super) fn next(&self) -> Option<Week> {
        self.get(Saturday)
            .and_then(Date::next_day)
            .map(Week::containing)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct EnumerateWeek<'a> {
    week: &'a Week,
    next_weekday: Option<Weekday>,
}

impl<'a> EnumerateWeek<'a> {
    fn new(week: &'a Week) -> Self {
        EnumerateWeek {
            week,
            next_weekday: Some(Sunday),
        }
    }
}

impl Iterator for EnumerateWeek<'_> {
    type Item = (Weekday, Date);

    fn next(&mut self) -> Option<(Weekday, Date)> {
        loop {
            let wd = self.next_weekday?;
            self.next_weekday = match wd.next() {
                Sunday => None,
                wd2 => Some(wd2),
            };
            if let Some(date) = self.week.get(wd) {
                return Some((wd, date));
            }
        }
    }
}

pub(super) fn around_date(date: Date, week_qty: NonZeroUsize) -> VecDeque<Week> {
    let mut weeks = VecDeque::with_capacity(week_qty.get() + 1);
    let start_week = Week::containing(date);
    weeks.push_front(start_week);
    for w in iter_weeks_before(start_week).take((week_qty.get() - 1) / 2) {
        weeks.push_front(w);
    }
    weeks.extend(iter_weeks_after(start_week).take(week_qty.get() - weeks.len()));
    if weeks.len() < week_qty.get() {
        // We are near the end of time, and so the "after" weeks were
        // short.  Fill towards the past.
        let front = *weeks.front().expect("weeks should be nonempty");
        for w in iter_weeks_before(front).take(week_qty.get() - weeks.len()) {
            weeks.push_front(w);
        }
    }
    weeks
}

fn iter_weeks_before(week: Week) -> impl Iterator<Item = Week> {
    successors(Some(week), Week::previous).skip(1)
}

fn iter_weeks_after(week: Week) -> impl Iterator<Item = Week> {
    successors(Some(week), Week::next).skip(1)
}

// Returns `None` if there are no weeks before `week`.  If there are weeks
// before `week`, but not `qty` of them, only as many weeks as possible are
// returned.
pub(super) fn weeks_before(week: Week, qty: NonZeroUsize) -> Option<VecDeque<Week>> {
    let mut iter = iter_weeks_before(week);
    let first_week = iter.next()?;
    let mut weeks = VecDeque::with_capacity(qty.get() + 1);
    weeks.push_front(first_week);
    for w in iter.take(qty.get() - 1) {
        weeks.push_front(w);
    }
    Some(weeks)
}

// Returns `None` if there are no weeks after `week`.  If there are weeks
// after `week`, but not `qty` of them, only as many weeks as possible are
// returned.
pub(super) fn weeks_after(week: Week, qty: NonZeroUsize) -> Option<VecDeque<Week>> {
    let mut iter = iter_weeks_after(week);
    let first_week = iter.next()?;
    let mut weeks = VecDeque::with_capacity(qty.get() + 1);
    weeks.push_back(first_week);
    weeks.extend(iter.take(qty.get() - 1));
    Some(weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_containing() {
        let week = Week::containing(date!(2023 - 11 - 16));
        let mut iter = week.enumerate();
        assert_eq!(iter.next(), Some((Sunday, date!(2023 - 11 - 12))));
        assert_eq!(iter.next(), Some((Monday, date!(2023 - 11 - 13))));
        assert_eq!(iter.next(), Some((Tuesday, date!(2023 - 11 - 14))));
        assert_eq!(iter.next(), Some((Wednesday, date!(2023 - 11 - 15))));
        assert_eq!(iter.next(), Some((Thursday, date!(2023 - 11 - 16))));
        assert_eq!(iter.next(), Some((Friday, date!(2023 - 11 - 17))));
        assert_eq!(iter.next(), Some((Saturday, date!(2023 - 11 - 18))));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_containing_week_edges() {
        let from_sunday = Week::containing(date!(2023 - 11 - 12));
        let from_saturday = Week::containing(date!(2023 - 11 - 18));
        assert_eq!(from_sunday, from_saturday);
        assert_eq!(from_sunday.first_day(), date!(2023 - 11 - 12));
        assert_eq!(from_sunday.last_day(), date!(2023 - 11 - 18));
    }

    #[test]
    fn test_end_of_time() {
        let week = Week::containing(Date::MAX);
        assert_eq!(week.last_day(), Date::MAX);
        assert_eq!(week.next(), None);
        assert!(week.previous().is_some());
        assert_eq!(weeks_after(week, NonZeroUsize::MIN), None);
    }

    #[test]
    fn test_around_date() {
        let weeks = around_date(
            date!(2024 - 06 - 05),
            NonZeroUsize::new(4).expect("4 is nonzero"),
        );
        let firsts = weeks.iter().map(Week::first_day).collect::<Vec<_>>();
        assert_eq!(
            firsts,
            [
                date!(2024 - 05 - 26),
                date!(2024 - 06 - 02),
                date!(2024 - 06 - 09),
                date!(2024 - 06 - 16),
            ]
        );
    }

    #[test]
    fn test_month_markers() {
        let week = Week::containing(date!(2024 - 12 - 30));
        assert!(week.has_month_start());
        assert_eq!(week.first_ym(), (2024, Month::December));
        assert_eq!(week.last_ym(), (2025, Month::January));
        assert!(week.contains(date!(2025 - 01 - 04)));
        assert!(!week.contains(date!(2025 - 01 - 05)));
        assert!(is_last_day_of_month(date!(2024 - 12 - 31)));
        assert!(!is_last_day_of_month(date!(2024 - 12 - 30)));
    }
}
