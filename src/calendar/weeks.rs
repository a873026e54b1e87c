use super::util::{around_date, weeks_after, weeks_before, Week};
use super::Schedule;
use crate::agenda::Agenda;
use crate::recurrence::DateRange;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use thiserror::Error;
use time::Date;
use tracing::debug;

/// The stack of whole weeks currently on screen, plus the classes that fall
/// within them.
///
/// The window always spans Sunday through Saturday of each displayed week, so
/// [`WeekWindow::visible_range`] is week-aligned.  Any navigation that changes
/// the visible range re-expands the schedule; the previous agenda is dropped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct WeekWindow<S> {
    pub(super) today: Date,
    focus: Date,
    weeks: Option<VecDeque<Week>>,
    schedule: S,
    agenda: Agenda,
}

impl<S: Schedule> WeekWindow<S> {
    pub(crate) fn new(today: Date, schedule: S) -> Self {
        WeekWindow {
            today,
            focus: today,
            weeks: None,
            schedule,
            agenda: Agenda::default(),
        }
    }

    pub(crate) fn start_date(mut self, date: Date) -> Self {
        self.focus = date;
        self
    }

    pub(crate) fn focus(&self) -> Date {
        self.focus
    }

    pub(crate) fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub(super) fn weeks(&self) -> Option<&VecDeque<Week>> {
        self.weeks.as_ref()
    }

    /// The dates currently on screen, from the Sunday of the top week to the
    /// Saturday of the bottom week.  `None` until the window has been sized.
    pub(crate) fn visible_range(&self) -> Option<DateRange> {
        let weeks = self.weeks.as_ref()?;
        let start = weeks.front()?.first_day();
        let end = weeks.back()?.last_day();
        Some(DateRange::new(start, end))
    }

    pub(super) fn ensure_weeks(&mut self, week_qty: NonZeroUsize) {
        let before = self.visible_range();
        if let Some(weeks) = self.weeks.as_mut() {
            match weeks.len().cmp(&week_qty.get()) {
                Ordering::Less => {
                    if let Some(mut extension) = nonzero_sub(week_qty, weeks.len())
                        .and_then(|missing| weeks.back().and_then(|&w| weeks_after(w, missing)))
                    {
                        weeks.append(&mut extension);
                    }
                    if let Some(missing) = nonzero_sub(week_qty, weeks.len()) {
                        // The terminal was heightened while at the end of
                        // time, so "scroll" the calendar down by prepending
                        // weeks from before the window.
                        if let Some(mut prextension) =
                            weeks.front().and_then(|&w| weeks_before(w, missing))
                        {
                            prextension.append(weeks);
                            *weeks = prextension;
                        }
                    }
                }
                Ordering::Greater => weeks.truncate(week_qty.get()),
                Ordering::Equal => (),
            }
        } else {
            self.weeks = Some(around_date(self.focus, week_qty));
        }
        self.clamp_focus();
        if self.visible_range() != before {
            self.refresh();
        }
    }

    pub(crate) fn jump_to_today(&mut self) {
        self.jump_to_date(self.today);
    }

    /// Focuses `date`.  If it isn't already on screen, the window is
    /// recentered around it.
    pub(crate) fn jump_to_date(&mut self, date: Date) {
        self.focus = date;
        if let Some(weeks) = self.weeks.as_mut() {
            if weeks.iter().any(|w| w.contains(date)) {
                return;
            }
            if let Some(qty) = NonZeroUsize::new(weeks.len()) {
                *weeks = around_date(date, qty);
                self.refresh();
            }
        }
    }

    pub(crate) fn one_week_forwards(&mut self) -> Result<(), OutOfTimeError> {
        let Some(weeks) = self.weeks.as_mut() else {
            return Ok(());
        };
        let w = weeks
            .back()
            .and_then(Week::next)
            .ok_or(OutOfTimeError)?;
        weeks.push_back(w);
        weeks.pop_front();
        self.clamp_focus();
        self.refresh();
        Ok(())
    }

    pub(crate) fn one_week_backwards(&mut self) -> Result<(), OutOfTimeError> {
        let Some(weeks) = self.weeks.as_mut() else {
            return Ok(());
        };
        let w = weeks
            .front()
            .and_then(Week::previous)
            .ok_or(OutOfTimeError)?;
        weeks.push_front(w);
        weeks.pop_back();
        self.clamp_focus();
        self.refresh();
        Ok(())
    }

    pub(crate) fn one_page_forwards(&mut self) -> Result<(), OutOfTimeError> {
        let Some(weeks) = self.weeks.as_mut() else {
            return Ok(());
        };
        let Some(week_qty) = NonZeroUsize::new(weeks.len()) else {
            return Ok(());
        };
        let mut page = weeks
            .back()
            .and_then(|&w| weeks_after(w, week_qty))
            .ok_or(OutOfTimeError)?;
        // A short page means we hit the end of time; keep enough of the old
        // weeks to fill the window.
        weeks.append(&mut page);
        weeks.rotate_left(weeks.len() - week_qty.get());
        weeks.truncate(week_qty.get());
        self.clamp_focus();
        self.refresh();
        Ok(())
    }

    pub(crate) fn one_page_backwards(&mut self) -> Result<(), OutOfTimeError> {
        let Some(weeks) = self.weeks.as_mut() else {
            return Ok(());
        };
        let Some(week_qty) = NonZeroUsize::new(weeks.len()) else {
            return Ok(());
        };
        let mut page = weeks
            .front()
            .and_then(|&w| weeks_before(w, week_qty))
            .ok_or(OutOfTimeError)?;
        page.append(weeks);
        page.truncate(week_qty.get());
        *weeks = page;
        self.clamp_focus();
        self.refresh();
        Ok(())
    }

    /// Moves the focus one day later, scrolling if it leaves the window
    pub(crate) fn focus_next_day(&mut self) -> Result<(), OutOfTimeError> {
        let next = self.focus.next_day().ok_or(OutOfTimeError)?;
        if self.visible_range().is_some_and(|r| !r.contains(next)) {
            self.one_week_forwards()?;
        }
        self.focus = next;
        Ok(())
    }

    /// Moves the focus one day earlier, scrolling if it leaves the window
    pub(crate) fn focus_previous_day(&mut self) -> Result<(), OutOfTimeError> {
        let prev = self.focus.previous_day().ok_or(OutOfTimeError)?;
        if self.visible_range().is_some_and(|r| !r.contains(prev)) {
            self.one_week_backwards()?;
        }
        self.focus = prev;
        Ok(())
    }

    // Keeps the focused day on screen after scrolling by moving it to the
    // nearest visible day
    fn clamp_focus(&mut self) {
        if let Some(range) = self.visible_range() {
            self.focus = self.focus.clamp(range.start, range.end);
        }
    }

    fn refresh(&mut self) {
        self.agenda = match self.visible_range() {
            Some(range) => {
                let agenda = self.schedule.agenda(range);
                if agenda.is_empty() {
                    debug!(start = %range.start, end = %range.end, "no classes in visible weeks");
                } else {
                    debug!(
                        start = %range.start,
                        end = %range.end,
                        classes = agenda.len(),
                        "expanded classes for visible weeks"
                    );
                }
                agenda
            }
            None => Agenda::default(),
        };
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;

fn nonzero_sub(lhs: NonZeroUsize, rhs: usize) -> Option<NonZeroUsize> {
    NonZeroUsize::new(lhs.get().saturating_sub(rhs))
}
