mod util;
mod weeks;
mod widget;
pub(crate) use self::weeks::WeekWindow;
pub(crate) use self::widget::Calendar;
use crate::agenda::Agenda;
use crate::recurrence::DateRange;
use crate::subject::Subject;

/// Something that can lay out classes over a date range.  The calendar asks
/// for a fresh agenda every time its visible range changes.
pub(crate) trait Schedule {
    fn agenda(&self, range: DateRange) -> Agenda;
}

impl<T: Schedule + ?Sized> Schedule for &T {
    fn agenda(&self, range: DateRange) -> Agenda {
        (**self).agenda(range)
    }
}

impl Schedule for [Subject] {
    fn agenda(&self, range: DateRange) -> Agenda {
        Agenda::for_range(self, range)
    }
}

impl Schedule for Vec<Subject> {
    fn agenda(&self, range: DateRange) -> Agenda {
        Agenda::for_range(self, range)
    }
}
