use crate::calendar::{Calendar, Schedule, WeekWindow};
use crate::dayview::DayView;
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::theme::BASE_STYLE;
use crossterm::event::{read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::Rect,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use time::Date;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct App<S> {
    weeks: WeekWindow<S>,
    state: AppState,
}

impl<S: Schedule> App<S> {
    pub(crate) fn new(weeks: WeekWindow<S>) -> App<S> {
        App {
            weeks,
            state: AppState::Calendar,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(&mut *self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = read()?
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('j') | KeyCode::Down => self.weeks.one_week_forwards().is_ok(),
                KeyCode::Char('k') | KeyCode::Up => self.weeks.one_week_backwards().is_ok(),
                KeyCode::Char('z') | KeyCode::PageDown => self.weeks.one_page_forwards().is_ok(),
                KeyCode::Char('w') | KeyCode::PageUp => self.weeks.one_page_backwards().is_ok(),
                KeyCode::Char('l') | KeyCode::Right => self.weeks.focus_next_day().is_ok(),
                KeyCode::Char('h') | KeyCode::Left => self.weeks.focus_previous_day().is_ok(),
                KeyCode::Char('0') | KeyCode::Home => {
                    self.weeks.jump_to_today();
                    true
                }
                KeyCode::Char('a') | KeyCode::Enter => {
                    self.state = AppState::DayView;
                    true
                }
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping | AppState::DayView => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    return true;
                }
                let output = match key {
                    KeyCode::Char(c) => match c.to_digit(10).and_then(|d| u8::try_from(d).ok()) {
                        Some(d) => state.handle_input(JumpToInput::Digit(d)),
                        None => JumpToOutput::Invalid,
                    },
                    KeyCode::Backspace | KeyCode::Delete => {
                        state.handle_input(JumpToInput::Backspace)
                    }
                    KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                    _ => JumpToOutput::Invalid,
                };
                match output {
                    JumpToOutput::Ok => true,
                    JumpToOutput::Invalid => false,
                    JumpToOutput::Jump(date) => {
                        self.state = AppState::Calendar;
                        self.jump_to(date);
                        true
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn jump_to(&mut self, date: Date) {
        self.weeks.jump_to_date(date);
    }
}

impl<S: Schedule> Widget for &mut App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        Calendar::<S>::new().render(area, buf, &mut self.weeks);
        match self.state {
            AppState::Helping => Help(BASE_STYLE).render(area, buf),
            AppState::DayView => {
                let focus = self.weeks.focus();
                DayView::new(focus, self.weeks.agenda().on(focus)).render(area, buf);
            }
            AppState::Jumping(ref mut state) => JumpTo.render(area, buf, state),
            AppState::Calendar | AppState::Quitting => (),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    DayView,
    Jumping(JumpToState),
    Quitting,
}
