use crate::theme::{
    jumpto::{READY_ENTER_STYLE, UNFILLED_CELL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use time::{Date, Month};

const OUTER_WIDTH: u16 = 16;
const OUTER_HEIGHT: u16 = 8;

/// Number of digits in `YYYYMMDD`; the cursor sits here once every digit has
/// been entered
const DIGITS: usize = 8;

/// Placeholder shown for each unfilled digit
const TEMPLATE: [char; DIGITS] = ['Y', 'Y', 'Y', 'Y', 'M', 'M', 'D', 'D'];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct JumpTo;

impl StatefulWidget for JumpTo {
    type State = JumpToState;

    /*
     * ................
     * .┌─ Go to… ───┐.
     * .│            │.
     * .│ YYYY-MM-DD │.
     * .│            │.
     * .│  [ENTER]   │.
     * .└────────────┘.
     * ................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Go to… ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text().render(text_area, buf);
    }
}

/// Digits typed so far into the go-to-date dialog
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct JumpToState {
    digits: [Option<u8>; DIGITS],
    pos: usize,
}

impl JumpToState {
    pub(crate) fn new() -> JumpToState {
        JumpToState::default()
    }

    fn is_complete(&self) -> bool {
        self.pos == DIGITS
    }

    fn to_text(self) -> Text<'static> {
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            self.to_line(),
            Line::styled("", BASE_STYLE),
            // Only the "[ENTER]" text, not its centering padding, should be
            // underlined, hence a styled span rather than a styled line
            Line::from(Span::styled(
                "[ENTER]",
                if self.is_complete() {
                    READY_ENTER_STYLE
                } else {
                    BASE_STYLE
                },
            )),
        ])
        .centered()
    }

    fn to_line(self) -> Line<'static> {
        let mut spans = Vec::with_capacity(DIGITS + 2);
        for (i, (digit, placeholder)) in self.digits.iter().zip(TEMPLATE).enumerate() {
            if i == 4 || i == 6 {
                spans.push(Span::styled("-", BASE_STYLE));
            }
            spans.push(match digit {
                Some(d) => Span::styled(d.to_string(), BASE_STYLE),
                None => Span::styled(placeholder.to_string(), UNFILLED_CELL_STYLE),
            });
        }
        Line::from_iter(spans)
    }

    // Folds `digits[range]` into a number; `None` if any digit is missing
    fn number(&self, start: usize, end: usize) -> Option<u16> {
        self.digits[start..end]
            .iter()
            .try_fold(0u16, |acc, d| Some(acc * 10 + u16::from((*d)?)))
    }

    fn date(&self) -> Option<Date> {
        let year = i32::from(self.number(0, 4)?);
        let month = Month::try_from(u8::try_from(self.number(4, 6)?).ok()?).ok()?;
        let day = u8::try_from(self.number(6, 8)?).ok()?;
        Date::from_calendar_date(year, month, day).ok()
    }

    pub(crate) fn handle_input(&mut self, input: JumpToInput) -> JumpToOutput {
        match input {
            JumpToInput::Digit(d) if d < 10 && !self.is_complete() => {
                self.digits[self.pos] = Some(d);
                self.pos += 1;
                JumpToOutput::Ok
            }
            JumpToInput::Backspace if self.pos > 0 => {
                self.pos -= 1;
                self.digits[self.pos] = None;
                JumpToOutput::Ok
            }
            JumpToInput::Enter if self.is_complete() => match self.date() {
                Some(date) => JumpToOutput::Jump(date),
                None => JumpToOutput::Invalid,
            },
            _ => JumpToOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToInput {
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToOutput {
    Ok,
    Invalid,
    Jump(Date),
}
