use crate::recurrence::{expand, CalendarEvent, DateRange};
use crate::subject::Subject;
use std::collections::BTreeMap;
use time::Date;

/// Occurrences of one expansion, bucketed by day.  An agenda is rebuilt from
/// scratch whenever the visible range changes; it is never edited in place.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Agenda {
    days: BTreeMap<Date, Vec<CalendarEvent>>,
    len: usize,
}

impl Agenda {
    pub(crate) fn new<I: IntoIterator<Item = CalendarEvent>>(events: I) -> Agenda {
        let mut days = BTreeMap::<Date, Vec<CalendarEvent>>::new();
        let mut len = 0;
        for event in events {
            days.entry(event.date()).or_default().push(event);
            len += 1;
        }
        for events in days.values_mut() {
            events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
        }
        Agenda { days, len }
    }

    /// Expands `subjects` over `range` and buckets the result
    pub(crate) fn for_range(subjects: &[Subject], range: DateRange) -> Agenda {
        Agenda::new(expand(subjects, range))
    }

    /// The classes taking place on `date`, earliest first
    pub(crate) fn on(&self, date: Date) -> &[CalendarEvent] {
        self.days
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Color of the earliest class on `date`
    pub(crate) fn first_color(&self, date: Date) -> Option<&str> {
        self.on(date).first().map(|e| e.meta.color.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }
}
