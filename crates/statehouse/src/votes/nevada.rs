use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};

use super::{RollCall, Tally, VoteError};
use crate::{
    dates::{expand_two_digit_year, iso},
    jurisdiction::JurisdictionProfile,
    types::{Extraction, RollCallEntry},
    utils::{child_elements, elements_after, stripped_text},
};

static HEADER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("font[size='+2']").expect("invalid selector: vote header"));
static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("invalid selector: table"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector: td"));
static RE_HEADER_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"on\s+(\d{1,2})-(\d{1,2})(?:-(\d{2,4}))?").expect("invalid regex: vote header date")
});
static RE_SUMMARY_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(.+)$").expect("invalid regex: summary cell"));

/// `Final Passage on 4-19-05`, or `on 4-19` with the year taken from the session name.
fn header_date(header: &str, session: &str, profile: &JurisdictionProfile) -> Option<String> {
    let caps = RE_HEADER_DATE.captures(header)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year = match caps.get(3) {
        Some(y) if y.as_str().len() == 2 => {
            expand_two_digit_year(y.as_str().parse().ok()?, profile.dates.year_pivot)
        }
        Some(y) => y.as_str().parse().ok()?,
        None => session.get(session.len().saturating_sub(4)..)?.parse().ok()?,
    };
    NaiveDate::from_ymd_opt(year, month, day).map(iso)
}

pub(super) fn tables(
    html: &str,
    profile: &JurisdictionProfile,
    session: &str,
) -> Result<Extraction<RollCall>, VoteError> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let Some(header) = root.select(&HEADER_SELECTOR).next() else {
        log::debug!("No vote header on NV roll-call page");
        return Ok(Extraction::NotFound);
    };
    let header_text = stripped_text(header);
    let date = header_date(&header_text, session, profile);

    let mut tables = elements_after(root, header, &TABLE_SELECTOR);
    let Some(summary) = tables.next() else {
        return Ok(Extraction::NotFound);
    };

    let mut printed = Tally::default();
    for cell in summary.select(&CELL_SELECTOR) {
        let text = stripped_text(cell);
        let Some(caps) = RE_SUMMARY_CELL.captures(&text) else {
            continue;
        };
        let Ok(count) = caps[1].parse::<u32>() else {
            continue;
        };
        let label = caps[2].to_lowercase();
        if label.starts_with("yea") {
            printed.yeas += count;
        } else if label.starts_with("nay") {
            printed.nays += count;
        } else {
            printed.other += count;
        }
    }

    let vocabulary = profile.vocabulary();
    let mut roll_call = Vec::new();
    if let Some(roster) = tables.next() {
        for row in roster.select(&ROW_SELECTOR).skip(1) {
            let cells: Vec<String> = child_elements(row, "td").map(stripped_text).collect();
            for pair in cells.chunks_exact(2) {
                let (name, response) = (&pair[0], &pair[1]);
                if name.is_empty() {
                    continue;
                }
                roll_call.push(RollCallEntry {
                    name: name.clone(),
                    response: vocabulary.lookup(response)?,
                });
            }
        }
    }

    Ok(Extraction::Found(RollCall {
        printed: Some(printed),
        roll_call,
        date,
        chamber: None,
        description: None,
    }))
}
