mod agenda;
mod app;
mod calendar;
mod config;
mod dayview;
mod help;
mod jumpto;
mod recurrence;
mod source;
mod subject;
mod theme;
use crate::app::App;
use crate::calendar::WeekWindow;
use crate::config::Config;
use crate::recurrence::{expand, DateRange};
use crate::source::{JsonFileSource, SubjectSource};
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date, OffsetDateTime,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static YMD_FMT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    subjects: Option<PathBuf>,
    date: Option<Date>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(Options),
    List {
        options: Options,
        range: Option<DateRange>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut options = Options::default();
        let mut list = false;
        let mut from = None;
        let mut to = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    options.config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('s') | Arg::Long("subjects") => {
                    options.subjects = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('l') | Arg::Long("list") => list = true,
                Arg::Long("from") => from = Some(parse_date(parser.value()?.string()?)?),
                Arg::Long("to") => to = Some(parse_date(parser.value()?.string()?)?),
                Arg::Value(value) if options.date.is_none() => {
                    options.date = Some(parse_date(value.string()?)?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        let range = match (from, to) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            (None, None) => None,
            _ => return Err("--from and --to must be given together".into()),
        };
        if range.is_some() && options.date.is_some() {
            Err("a DATE argument cannot be combined with --from and --to".into())
        } else if list {
            Ok(Command::List { options, range })
        } else if range.is_some() {
            Err("--from and --to require --list".into())
        } else {
            Ok(Command::Run(options))
        }
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(options) => {
                let config = Config::load(options.config.as_deref())?;
                init_logging(&config, true)?;
                let subjects = load_subjects(&config, &options)?;
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    let mut weeks = WeekWindow::new(today, subjects);
                    if let Some(date) = options.date {
                        weeks = weeks.start_date(date);
                    }
                    App::new(weeks).run(&mut terminal)?;
                    Ok(())
                })
            }
            Command::List { options, range } => {
                let config = Config::load(options.config.as_deref())?;
                init_logging(&config, false)?;
                let subjects = load_subjects(&config, &options)?;
                let range = match (range, options.date) {
                    (Some(range), _) => range,
                    (None, Some(date)) => DateRange::month_weeks(date),
                    (None, None) => DateRange::month_weeks(
                        OffsetDateTime::now_local()
                            .context("failed to determine local date")?
                            .date(),
                    ),
                };
                let events = expand(&subjects, range).collect::<Vec<_>>();
                info!(
                    start = %range.start,
                    end = %range.end,
                    count = events.len(),
                    "expanded classes"
                );
                let mut out = io::stdout().lock();
                serde_json::to_writer_pretty(&mut out, &events)
                    .context("failed to write events")?;
                writeln!(out).context("failed to write events")?;
                Ok(())
            }
            Command::Help => {
                println!("Usage: evalia-cal [options] [YYYY-MM-DD]");
                println!();
                println!("Terminal calendar of EvalIA's recurring weekly classes");
                println!();
                println!("Options:");
                println!("  -c, --config <FILE>     Read configuration from FILE [default: evalia.toml]");
                println!("  -s, --subjects <FILE>   Read subjects from FILE (\"-\" for stdin)");
                println!("  -l, --list              Print the classes as JSON instead of browsing");
                println!("      --from <DATE>       First day to list (with --to)");
                println!("      --to <DATE>         Last day to list (with --from)");
                println!("  -h, --help              Display this help message and exit");
                println!("  -V, --version           Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn parse_date(value: String) -> Result<Date, lexopt::Error> {
    Date::parse(&value, &YMD_FMT).map_err(|e| lexopt::Error::ParsingFailed {
        value,
        error: Box::new(e),
    })
}

fn load_subjects(config: &Config, options: &Options) -> anyhow::Result<Vec<subject::Subject>> {
    let path = options.subjects.as_ref().unwrap_or(&config.subjects);
    Ok(JsonFileSource::new(path).subjects()?)
}

// The terminal UI owns stdout and stderr, so interactive runs only log when a
// log file is configured
fn init_logging(config: &Config, interactive: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_env("EVALIA_LOG").unwrap_or_else(|_| EnvFilter::new(&config.log));
    if let Some(path) = &config.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else if !interactive {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init();
    }
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
