use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

static TEXT: &[&str] = &[
    "j, DOWN         Scroll down one week",
    "k, UP           Scroll up one week",
    "z, PAGE DOWN    Scroll down one page",
    "w, PAGE UP      Scroll up one page",
    "l, RIGHT        Focus next day",
    "h, LEFT         Focus previous day",
    "a, ENTER        Classes on focused day",
    "0, HOME         Jump to today",
    "g               Input date to jump to",
    "?               Show this help",
    "q, ESC          Quit",
    "",
    "Press the Any Key to dismiss.",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Text::from_iter(TEXT.iter().map(|&s| Line::raw(s)));
        popup(" Commands ", text, self.0, area, buf);
    }
}

/// Draws `text` in a bordered box centered in `area`, clearing what's behind
/// it.  Shared by the help screen and the day view.
pub(crate) fn popup(title: &str, text: Text<'_>, style: Style, area: Rect, buf: &mut Buffer) {
    let height = u16::try_from(text.height())
        .unwrap_or(u16::MAX)
        .min(area.height)
        .saturating_add(2);
    let width = u16::try_from(text.width())
        .unwrap_or(u16::MAX)
        .max(u16::try_from(title.chars().count()).unwrap_or(u16::MAX))
        .min(area.width)
        .saturating_add(2);
    let para = Paragraph::new(text)
        .block(
            Block::bordered()
                .title(title)
                .title_alignment(Alignment::Center),
        )
        .style(style);
    let [inner_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
    let [inner_area] = Layout::vertical([height])
        .flex(Flex::Center)
        .areas(inner_area);
    let outer_area = Rect {
        x: inner_area.x.saturating_sub(1),
        y: inner_area.y,
        width: inner_area.width.saturating_add(2),
        height: inner_area.height,
    }
    .intersection(area);
    Clear.render(outer_area, buf);
    Block::new().style(style).render(outer_area, buf);
    para.render(inner_area, buf);
}
