use std::fmt::{self, Display, Formatter};
use std::mem;

use crate::math;
use crate::scala::ScaleDegrees;

/// Parses the content of a Scala (`.scl`) file.
///
/// The text is read character by character. `!` starts a comment that extends to the end of the line, no matter which section is being read.
/// The first non-comment line is the description, the second one the number of degrees `N` and the following `N` lines are the degrees themselves.
///
/// A degree containing a `.` is a cents value, a degree containing a `/` is a fraction and anything else is an integer ratio.
/// Text after the first whitespace of a line is an annotation and is ignored.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use scala_notemap::scala;
/// let scl_text = "\
/// ! example.scl
/// !
/// Meantone fragment
///  3
/// !
///  193.157 ! whole tone
///  5/4
///  2
/// ";
///
/// let degrees = scala::parse_scl(scl_text).unwrap();
/// assert_eq!(degrees.description(), "Meantone fragment");
/// assert_approx_eq!(degrees.ratios()[1], 1.118034);
/// assert_approx_eq!(degrees.ratios()[2], 1.25);
/// assert_approx_eq!(degrees.ratios()[3], 2.0);
/// ```
pub fn parse_scl(scl_text: &str) -> Result<ScaleDegrees, SclParseError> {
    let mut parser = SclParser::new();
    for character in scl_text.chars() {
        parser.consume(character)?;
    }
    parser.finalize()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ParseState {
    Description,
    EntryCount,
    Ratios,
}

struct SclParser {
    state: ParseState,
    in_comment: bool,
    line_number: usize,
    current_line: String,
    description: String,
    num_entries: usize,
    ratios: Vec<f64>,
}

impl SclParser {
    fn new() -> Self {
        Self {
            state: ParseState::Description,
            in_comment: false,
            line_number: 1,
            current_line: String::new(),
            description: String::new(),
            num_entries: 0,
            ratios: vec![1.0],
        }
    }

    fn consume(&mut self, character: char) -> Result<(), SclParseError> {
        if self.in_comment {
            if character == '\n' {
                self.in_comment = false;
                if !self.current_line.trim().is_empty() {
                    self.finish_line()?;
                }
                self.line_number += 1;
            }
            return Ok(());
        }

        match character {
            '!' => {
                // A comment may terminate a degree on the same line
                if self.state == ParseState::Ratios && self.current_line.chars().count() > 1 {
                    self.finish_line()?;
                }
                self.in_comment = true;
            }
            '\n' => {
                self.finish_line()?;
                self.line_number += 1;
            }
            other => self.current_line.push(other),
        }
        Ok(())
    }

    fn finish_line(&mut self) -> Result<(), SclParseError> {
        let line = mem::take(&mut self.current_line);
        let line = line.trim();

        match self.state {
            ParseState::Description => {
                self.description = match line {
                    "" => "No Info".to_owned(),
                    description => description.to_owned(),
                };
                self.state = ParseState::EntryCount;
            }
            ParseState::EntryCount => {
                if line.is_empty() {
                    return Ok(());
                }
                let num_entries: usize = main_item(line)
                    .parse()
                    .map_err(|_| self.error(SclParseErrorKind::InvalidEntryCount))?;
                if num_entries == 0 {
                    return Err(self.error(SclParseErrorKind::ZeroEntries));
                }
                self.num_entries = num_entries;
                self.state = ParseState::Ratios;
            }
            ParseState::Ratios => {
                if line.is_empty() {
                    return Ok(());
                }
                let ratio = parse_ratio(line).map_err(|kind| self.error(kind))?;
                self.ratios.push(ratio);
            }
        }
        Ok(())
    }

    fn finalize(mut self) -> Result<ScaleDegrees, SclParseError> {
        if !self.current_line.trim().is_empty() {
            self.finish_line()?;
        }

        let num_parsed = self.ratios.len() - 1;
        if self.state != ParseState::Ratios || num_parsed != self.num_entries {
            return Err(self.error(SclParseErrorKind::EntryCountMismatch));
        }

        Ok(ScaleDegrees {
            description: self.description,
            ratios: self.ratios,
        })
    }

    fn error(&self, kind: SclParseErrorKind) -> SclParseError {
        SclParseError {
            line_number: self.line_number,
            kind,
        }
    }
}

fn parse_ratio(line: &str) -> Result<f64, SclParseErrorKind> {
    let main_item = main_item(line);
    if main_item.contains('.') {
        let cents_value: f64 = parse(main_item)?;
        if !cents_value.is_finite() {
            return Err(SclParseErrorKind::MalformedRatioToken);
        }
        Ok(math::cents_to_ratio(cents_value))
    } else if let Some((numer, denom)) = main_item.split_once('/') {
        let numer: u32 = parse(numer)?;
        let denom: u32 = parse(denom)?;
        if numer == 0 || denom == 0 {
            return Err(SclParseErrorKind::ZeroDenominatorOrNumerator);
        }
        Ok(f64::from(numer) / f64::from(denom))
    } else {
        let int_value: u32 = parse(main_item)?;
        Ok(f64::from(int_value))
    }
}

fn parse<T: std::str::FromStr>(item: &str) -> Result<T, SclParseErrorKind> {
    item.parse()
        .map_err(|_| SclParseErrorKind::MalformedRatioToken)
}

fn main_item(line: &str) -> &str {
    line.split_ascii_whitespace().next().unwrap_or("")
}

/// Error reported when parsing Scala text fails. Parsing stops at the first error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SclParseError {
    /// 1-based line at which the error was detected.
    pub line_number: usize,
    pub kind: SclParseErrorKind,
}

/// Specifies which part of the Scala text is malformed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SclParseErrorKind {
    /// The number of degrees is not an integer.
    InvalidEntryCount,

    /// The number of degrees is 0.
    ZeroEntries,

    /// A degree is neither a cents value, a fraction nor an integer.
    MalformedRatioToken,

    /// A fraction has a zero numerator or denominator.
    ZeroDenominatorOrNumerator,

    /// The number of degrees found differs from the declared number of degrees.
    EntryCountMismatch,
}

impl Display for SclParseError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.kind)
    }
}

impl Display for SclParseErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let message = match self {
            SclParseErrorKind::InvalidEntryCount => "number of notes is not an integer",
            SclParseErrorKind::ZeroEntries => "number of notes is zero",
            SclParseErrorKind::MalformedRatioToken => "invalid pitch value",
            SclParseErrorKind::ZeroDenominatorOrNumerator => {
                "fraction has a zero numerator or denominator"
            }
            SclParseErrorKind::EntryCountMismatch => {
                "number of pitch lines does not match the number of notes"
            }
        };
        f.write_str(message)
    }
}

impl std::error::Error for SclParseError {}
