//! Per-directory date correction negotiated with the operator
//!
//! When an expected year is configured and a file resolves to a different
//! year, the operator is asked for a corrected month and day (`mmdd`). After
//! a correction is adopted, two yes/no questions decide whether it sticks for
//! the rest of the directory pass:
//!
//! 1. reuse the same month-day for every following file, and if so
//! 2. reuse the derived offset instead (`corrected = original + offset`).
//!
//! An empty or short answer applies no correction and sticks to nothing.

use crate::media::Timestamp;
use chrono::{Datelike, NaiveDate, TimeDelta};
use console::Term;
use dialoguer::{Confirm, Input};
use regex::Regex;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Source of operator answers
pub trait Prompter {
    /// Ask a free-text question; blocks until answered
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Ask a yes/no question
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{} [y/n]", question))?;
        Ok(matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

/// Prompter reading from the terminal
///
/// Falls back to plain line reads from stdin when stderr is not a terminal,
/// so piped answers and `2>&1 | tee` runs still get corrected.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompter;

impl ConsolePrompter {
    fn lines() -> LinePrompter<io::StdinLock<'static>, io::Stderr> {
        LinePrompter::new(io::stdin().lock(), io::stderr())
    }
}

impl Prompter for ConsolePrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        if !Term::stderr().is_term() {
            return Self::lines().ask(question);
        }
        match Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
        {
            Ok(answer) => Ok(answer),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::NotConnected => {
                Self::lines().ask(question)
            }
            Err(dialoguer::Error::IO(e)) => Err(e),
        }
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        if !Term::stderr().is_term() {
            return Self::lines().confirm(question);
        }
        match Confirm::new().with_prompt(question).interact() {
            Ok(answer) => Ok(answer),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::NotConnected => {
                Self::lines().confirm(question)
            }
            Err(dialoguer::Error::IO(e)) => Err(e),
        }
    }
}

/// Prompter writing questions to `output` and reading one line per answer
///
/// An empty line is an empty answer; only end of input is an error.
#[derive(Debug)]
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}: ", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no more input from operator",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

static MONTH_DAY_PATTERN: OnceLock<Regex> = OnceLock::new();

fn month_day_pattern() -> &'static Regex {
    MONTH_DAY_PATTERN
        .get_or_init(|| Regex::new(r"^(\d{2})(\d{2})$").expect("valid month-day pattern"))
}

/// Month and day as entered by the operator (`mmdd`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    /// Parse a four-digit `mmdd` string
    pub fn parse(s: &str) -> Option<Self> {
        let caps = month_day_pattern().captures(s.trim())?;
        Some(Self {
            month: caps[1].parse().ok()?,
            day: caps[2].parse().ok()?,
        })
    }

    /// The calendar date in `year`, if it exists
    pub fn date_in(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.month, self.day)
    }
}

/// Correction that applies to every following file of a directory pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickyCorrection {
    /// Re-anchor each file to this month-day in the expected year
    MonthDay(MonthDay),
    /// Shift each file by this signed offset
    Offset(TimeDelta),
}

/// How the timestamp of one file was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Timestamp left as resolved
    None,
    /// Re-anchored to a month-day
    Override(MonthDay),
    /// Shifted by an offset
    Offset(TimeDelta),
}

/// Outcome of negotiating one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated {
    /// Timestamp as resolved from the file
    pub original: Timestamp,
    /// Timestamp to use for naming
    pub timestamp: Timestamp,
    pub resolution: Resolution,
}

impl Negotiated {
    fn unchanged(original: Timestamp) -> Self {
        Self {
            original,
            timestamp: original,
            resolution: Resolution::None,
        }
    }

    /// Whether the correction moved the timestamp
    pub fn is_changed(&self) -> bool {
        self.timestamp != self.original
    }
}

/// Correction decisions carried across the files of one directory pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryCorrectionState {
    expected_year: Option<i32>,
    sticky: Option<StickyCorrection>,
    override_consumed: bool,
}

impl DirectoryCorrectionState {
    /// Fresh state for a new directory pass
    pub fn new(expected_year: Option<i32>) -> Self {
        Self {
            expected_year,
            sticky: None,
            override_consumed: false,
        }
    }

    pub fn expected_year(&self) -> Option<i32> {
        self.expected_year
    }

    pub fn sticky(&self) -> Option<StickyCorrection> {
        self.sticky
    }

    /// Whether the operator adopted a correction during this pass
    pub fn override_consumed(&self) -> bool {
        self.override_consumed
    }

    /// Settle the timestamp of one file, prompting the operator if needed
    pub fn negotiate(
        &mut self,
        path: &Path,
        original: Timestamp,
        prompter: &mut dyn Prompter,
    ) -> Negotiated {
        let Some(year) = self.expected_year else {
            return Negotiated::unchanged(original);
        };

        match self.sticky {
            Some(StickyCorrection::Offset(offset)) => {
                return apply_offset(path, original, offset);
            }
            Some(StickyCorrection::MonthDay(month_day)) => {
                return apply_month_day(path, original, year, month_day);
            }
            None => {}
        }

        if original.year() == year {
            return Negotiated::unchanged(original);
        }

        info!(
            "Found a file with non-matching date ({} vs {}): {}",
            original.format("%Y%m%d"),
            year,
            path.display()
        );

        let Some((month_day, date)) = ask_month_day(original, year, prompter) else {
            return Negotiated::unchanged(original);
        };

        let corrected = date.and_time(original.time());
        let offset = corrected - original;
        self.override_consumed = true;

        let dir = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let reuse_date = confirm_or_decline(
            prompter,
            &format!(
                "Would you like to use the date '{}' to update all files in '{}'?",
                month_day, dir
            ),
        );

        self.sticky = if !reuse_date {
            None
        } else if confirm_or_decline(
            prompter,
            &format!(
                "Would you like to use the offset '{}' to update all files in '{}'?",
                format_offset(offset),
                dir
            ),
        ) {
            Some(StickyCorrection::Offset(offset))
        } else {
            Some(StickyCorrection::MonthDay(month_day))
        };
        debug!(sticky = ?self.sticky, "Correction policy for directory");

        Negotiated {
            original,
            timestamp: corrected,
            resolution: Resolution::Override(month_day),
        }
    }
}

/// Ask until a valid `mmdd` is given or the answer is empty/short
fn ask_month_day(
    original: Timestamp,
    year: i32,
    prompter: &mut dyn Prompter,
) -> Option<(MonthDay, NaiveDate)> {
    loop {
        let answer = prompter
            .ask("Please enter new date for given file (form: mmdd)")
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read an answer, treating it as empty");
                String::new()
            });
        let answer = answer.trim();

        if answer.len() < 4 {
            info!(
                "No date entered, keeping original date ({})",
                original.format("%m%d")
            );
            return None;
        }

        if let Some(month_day) = MonthDay::parse(answer)
            && let Some(date) = month_day.date_in(year)
        {
            return Some((month_day, date));
        }
        warn!("'{}' is not a valid date in {} (form: mmdd)", answer, year);
    }
}

fn confirm_or_decline(prompter: &mut dyn Prompter, question: &str) -> bool {
    prompter.confirm(question).unwrap_or_else(|e| {
        warn!(error = %e, "Could not read an answer, treating it as no");
        false
    })
}

fn apply_offset(path: &Path, original: Timestamp, offset: TimeDelta) -> Negotiated {
    match original.checked_add_signed(offset) {
        Some(timestamp) => Negotiated {
            original,
            timestamp,
            resolution: Resolution::Offset(offset),
        },
        None => {
            warn!(?path, "Offset moves the date out of range, keeping original");
            Negotiated::unchanged(original)
        }
    }
}

fn apply_month_day(path: &Path, original: Timestamp, year: i32, month_day: MonthDay) -> Negotiated {
    match month_day.date_in(year) {
        Some(date) => Negotiated {
            original,
            timestamp: date.and_time(original.time()),
            resolution: Resolution::Override(month_day),
        },
        None => {
            warn!(?path, %month_day, year, "Not a valid date, keeping original");
            Negotiated::unchanged(original)
        }
    }
}

/// Render an offset as `<D> days, H:MM:SS`, days rounded towards negative infinity
pub fn format_offset(offset: TimeDelta) -> String {
    let total = offset.num_seconds();
    let days = total.div_euclid(86_400);
    let rest = total.rem_euclid(86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);

    match days {
        0 => clock,
        1 | -1 => format!("{} day, {}", days, clock),
        _ => format!("{} days, {}", days, clock),
    }
}
