//! Normalises the many date spellings found on legislature sites to `YYYY-MM-DD`.
//!
//! Parsing never fails loudly: [`normalize_date`] hands back the raw text when
//! no known format matches, so a malformed date can reach the output files.
//! Callers that need a real date should use [`parse_date`] and handle `None`.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::utils::normalize_whitespace;

/// Two-digit years above this value are read as 19xx, the rest as 20xx.
///
/// `04/03/97` is 1997 and `01/15/25` is 2025. Dates from 2026 onwards written
/// with two-digit years will be read as 1926+; jurisdictions that publish such
/// dates must raise the pivot through [`DateNormalizer`].
pub const TWO_DIGIT_YEAR_PIVOT: u32 = 25;

static RE_SLASH_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})$").expect("invalid regex: slash short year")
});
static RE_SLASH_LONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("invalid regex: slash long year")
});
static RE_DASH_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})-(\d{1,2})-(\d{1,2})$").expect("invalid regex: dashed short year")
});
static RE_ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:T[\d:.]+Z?)?$").expect("invalid regex: iso")
});

static RE_DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})\b",
        r"|\b[A-Za-z]{3}-\d{1,2}-\d{4}\b",
        r"|\b[A-Za-z]{3}\.\s?\d{1,2},\s?\d{4}\b",
        r"|\b[A-Za-z]{3,9}\s+\d{1,2},\s+\d{4}\b",
    ))
    .expect("invalid regex: date token")
});

/// Every spelling the normaliser understands, in the order it tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `04/03/97`
    SlashShortYear,
    /// `1/5/1995`
    SlashLongYear,
    /// `Apr 3, 1997`
    AbbrevMonthSpaced,
    /// `April 3, 1997`
    FullMonthSpaced,
    /// `Apr-21-1999`
    AbbrevMonthDashed,
    /// `Apr.01,1999`
    AbbrevMonthDotCompact,
    /// `Mar. 27, 2007`
    AbbrevMonthDotSpaced,
    /// `98-01-22`
    DashedShortYear,
    /// `1999-04-21` and `1999-04-21T00:00:00`
    Iso,
}

impl DateFormat {
    pub const ALL: [DateFormat; 9] = [
        DateFormat::SlashShortYear,
        DateFormat::SlashLongYear,
        DateFormat::AbbrevMonthSpaced,
        DateFormat::FullMonthSpaced,
        DateFormat::AbbrevMonthDashed,
        DateFormat::AbbrevMonthDotCompact,
        DateFormat::AbbrevMonthDotSpaced,
        DateFormat::DashedShortYear,
        DateFormat::Iso,
    ];

    fn chrono_pattern(&self) -> Option<&'static str> {
        match self {
            DateFormat::AbbrevMonthSpaced => Some("%b %d, %Y"),
            DateFormat::FullMonthSpaced => Some("%B %d, %Y"),
            DateFormat::AbbrevMonthDashed => Some("%b-%d-%Y"),
            DateFormat::AbbrevMonthDotCompact => Some("%b.%d,%Y"),
            DateFormat::AbbrevMonthDotSpaced => Some("%b. %d, %Y"),
            _ => None,
        }
    }

    /// Renders `date` the way a legislature page would print it in this format.
    pub fn format(&self, date: NaiveDate) -> String {
        match self {
            DateFormat::SlashShortYear => date.format("%m/%d/%y").to_string(),
            DateFormat::SlashLongYear => date.format("%-m/%-d/%Y").to_string(),
            DateFormat::DashedShortYear => date.format("%y-%m-%d").to_string(),
            DateFormat::Iso => date.format("%Y-%m-%d").to_string(),
            other => match other.chrono_pattern() {
                Some(pattern) => date.format(pattern).to_string(),
                None => date.format("%Y-%m-%d").to_string(),
            },
        }
    }

    fn parse(&self, text: &str, year_pivot: u32) -> Option<NaiveDate> {
        let numeric = |re: &LazyLock<Regex>, order: [usize; 3], short_year: bool| {
            let caps = re.captures(text)?;
            let field = |i: usize| caps[order[i]].parse::<u32>().ok();
            let (year, month, day) = (field(0)?, field(1)?, field(2)?);
            let year = if short_year {
                expand_two_digit_year(year, year_pivot)
            } else {
                i32::try_from(year).ok()?
            };
            NaiveDate::from_ymd_opt(year, month, day)
        };

        match self {
            DateFormat::SlashShortYear => numeric(&RE_SLASH_SHORT, [3, 1, 2], true),
            DateFormat::SlashLongYear => numeric(&RE_SLASH_LONG, [3, 1, 2], false),
            DateFormat::DashedShortYear => numeric(&RE_DASH_SHORT, [1, 2, 3], true),
            DateFormat::Iso => numeric(&RE_ISO, [1, 2, 3], false),
            other => {
                let pattern = other.chrono_pattern()?;
                NaiveDate::parse_from_str(text, pattern).ok()
            }
        }
    }
}

/// Turns `yy` into a four-digit year using `pivot` (`yy > pivot` is 19yy).
pub fn expand_two_digit_year(yy: u32, pivot: u32) -> i32 {
    let yy = (yy % 100) as i32;
    if yy > pivot as i32 { 1900 + yy } else { 2000 + yy }
}

/// Date parser carrying a jurisdiction's two-digit-year pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    pub year_pivot: u32,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self {
            year_pivot: TWO_DIGIT_YEAR_PIVOT,
        }
    }
}

impl DateNormalizer {
    pub fn new(year_pivot: u32) -> Self {
        Self { year_pivot }
    }

    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let text = normalize_whitespace(raw);
        if text.is_empty() {
            return None;
        }
        DateFormat::ALL
            .iter()
            .find_map(|format| format.parse(&text, self.year_pivot))
    }

    /// ISO date for `raw`, or `raw` trimmed when nothing matches.
    pub fn normalize(&self, raw: &str) -> String {
        match self.parse(raw) {
            Some(date) => iso(date),
            None => {
                log::debug!("Unrecognised date format, keeping raw text: {:?}", raw);
                raw.trim().to_string()
            }
        }
    }

    /// Hearing tables print `MM-DD` and rely on the session year.
    pub fn month_day_in_year(&self, month_day: &str, year: i32) -> Option<NaiveDate> {
        let (mm, dd) = month_day.trim().split_once('-')?;
        NaiveDate::from_ymd_opt(year, mm.trim().parse().ok()?, dd.trim().parse().ok()?)
    }
}

pub fn iso(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateNormalizer::default().parse(raw)
}

pub fn normalize_date(raw: &str) -> String {
    DateNormalizer::default().normalize(raw)
}

/// First date-shaped token in free text.
pub fn find_date_token(text: &str) -> Option<&str> {
    RE_DATE_TOKEN.find(text).map(|m| m.as_str())
}

/// True when `date` is already canonical `YYYY-MM-DD`.
pub fn is_iso(date: &str) -> bool {
    date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}
