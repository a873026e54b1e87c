use crate::help::popup;
use crate::recurrence::CalendarEvent;
use crate::theme::{
    class_style,
    dayview::{EMPTY_STYLE, TIME_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::Widget,
};
use time::{format_description::BorrowedFormatItem, macros::format_description, Date, Time};

static HM_FMT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");

/// Popup listing the classes on a single day
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DayView<'a> {
    date: Date,
    classes: &'a [CalendarEvent],
}

impl<'a> DayView<'a> {
    pub(crate) fn new(date: Date, classes: &'a [CalendarEvent]) -> Self {
        DayView { date, classes }
    }

    fn title(&self) -> String {
        format!(" {} {} ", self.date.weekday(), self.date)
    }

    fn lines(&self) -> Vec<Line<'static>> {
        if self.classes.is_empty() {
            return vec![Line::styled("No classes", EMPTY_STYLE)];
        }
        self.classes
            .iter()
            .map(|class| {
                Line::from_iter([
                    Span::styled(
                        format!(
                            "{}–{}",
                            hhmm(class.start.time()),
                            hhmm(class.end.time())
                        ),
                        TIME_STYLE,
                    ),
                    Span::styled("  ", BASE_STYLE),
                    Span::styled(class.title.clone(), class_style(&class.meta.color)),
                ])
            })
            .collect()
    }
}

impl Widget for DayView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        popup(&self.title(), Text::from(self.lines()), BASE_STYLE, area, buf);
    }
}

fn hhmm(t: Time) -> String {
    t.format(&HM_FMT)
        .unwrap_or_else(|_| format!("{:02}:{:02}", t.hour(), t.minute()))
}
