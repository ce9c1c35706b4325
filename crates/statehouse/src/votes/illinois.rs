use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use scraper::{Html, Selector};

use super::{RollCall, Tally, VoteError, page_date};
use crate::{
    jurisdiction::JurisdictionProfile,
    sponsors::title_case,
    types::{Chamber, Extraction, RollCallEntry},
    utils::{block_text, elem_text, normalize_whitespace},
};

static BLOCK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, pre").expect("invalid selector: p, pre"));
static RE_ROLL_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ROLL\s*CALL").expect("invalid regex: roll call"));
static RE_TALLY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"YEAS.*NAYS").expect("invalid regex: tally line"));
static RE_TALLY_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+([A-Z]+)").expect("invalid regex: tally pair"));
static RE_CELL_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("invalid regex: cell gap"));
static RE_ROSTER_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{1,2})\s+([A-Z][A-Za-z' .,\-]*)$").expect("invalid regex: roster cell"));

/// Fixed-width roll call: `110 YEAS  5 NAYS  2 PRESENT` then columns of `Y NAME` cells.
pub(super) fn roll_call_text(html: &str, profile: &JurisdictionProfile) -> Result<Extraction<RollCall>, VoteError> {
    let document = Html::parse_document(html);
    let text = match document
        .select(&BLOCK_SELECTOR)
        .find(|block| elem_text(*block).contains("YEAS"))
    {
        Some(block) => block_text(block),
        None if !html.contains('<') && html.contains("YEAS") => html.to_string(),
        None => return Ok(Extraction::NotFound),
    };
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();

    let Some(tally_at) = lines.iter().position(|line| RE_TALLY_LINE.is_match(line)) else {
        return Ok(Extraction::NotFound);
    };
    let roll_call_at = lines[..tally_at]
        .iter()
        .rposition(|line| RE_ROLL_CALL.is_match(line));

    let chamber = roll_call_at
        .and_then(|i| lines[i].split_whitespace().next())
        .and_then(|word| Chamber::from_str(word).ok());

    let header = &lines[roll_call_at.map_or(0, |i| i + 1)..tally_at];
    let date = header.iter().find_map(|line| page_date(line, profile));
    let description = normalize_whitespace(
        &header
            .iter()
            .filter(|line| page_date(line, profile).is_none())
            .copied()
            .collect::<Vec<_>>()
            .join(" "),
    );

    let mut printed = Tally::default();
    for caps in RE_TALLY_PAIR.captures_iter(lines[tally_at]) {
        let Ok(count) = caps[1].parse::<u32>() else {
            continue;
        };
        match &caps[2] {
            "YEAS" => printed.yeas += count,
            "NAYS" => printed.nays += count,
            _ => printed.other += count,
        }
    }

    let vocabulary = profile.vocabulary();
    let mut roll_call = Vec::new();
    for line in &lines[tally_at + 1..] {
        // The roster ends at the first blank line; legends follow it.
        if line.trim().is_empty() {
            if roll_call.is_empty() {
                continue;
            }
            break;
        }
        for cell in RE_CELL_GAP.split(line.trim()) {
            let Some(caps) = RE_ROSTER_CELL.captures(cell) else {
                continue;
            };
            roll_call.push(RollCallEntry {
                name: title_case(&caps[2]),
                response: vocabulary.lookup(&caps[1])?,
            });
        }
    }

    Ok(Extraction::Found(RollCall {
        printed: Some(printed),
        roll_call,
        date,
        chamber,
        description: (!description.is_empty()).then_some(description),
    }))
}

#[cfg(test)]
mod tests {
    use crate::{
        types::{Chamber, Jurisdiction, VoteResponse},
        votes::{TallyPolicy, VoteError, VoteFormat, extract_roll_call},
    };

    const PAGE: &str = "<html><body><p>
                    STATE OF ILLINOIS
               91ST GENERAL ASSEMBLY
                 HOUSE ROLL CALL
                  HOUSE BILL 12
                  SCHOOL FEES
                  THIRD READING
                  PASSED
                  3/24/1999

     4 YEAS      1 NAYS      1 PRESENT

 Y ACEVEDO       Y DE LEO        N LANG
 Y MADIGAN       P MOORE         E PARKE
</p></body></html>";

    #[test]
    fn test_il_roll_call_text() {
        let profile = Jurisdiction::Il.profile();
        let rc = extract_roll_call(PAGE, VoteFormat::IlRollCallText, &profile, "91st")
            .unwrap()
            .found()
            .unwrap();

        assert_eq!(rc.chamber, Some(Chamber::House));
        assert_eq!(rc.date.as_deref(), Some("1999-03-24"));
        assert_eq!(
            rc.description.as_deref(),
            Some("HOUSE BILL 12 SCHOOL FEES THIRD READING PASSED")
        );

        let roster: Vec<(&str, VoteResponse)> = rc
            .roll_call
            .iter()
            .map(|e| (e.name.as_str(), e.response))
            .collect();
        assert_eq!(
            roster,
            [
                ("Acevedo", VoteResponse::Yea),
                ("De Leo", VoteResponse::Yea),
                ("Lang", VoteResponse::Nay),
                ("Madigan", VoteResponse::Yea),
                ("Moore", VoteResponse::Present),
                ("Parke", VoteResponse::NotVoting),
            ]
        );

        // E counts as other in the roster but the page prints only YEAS/NAYS/PRESENT.
        let tally = rc.tally(TallyPolicy::TrustPage);
        assert_eq!((tally.yeas, tally.nays, tally.other), (4, 1, 1));
        assert_eq!(rc.roster_tally().other, 2);
    }

    #[test]
    fn test_not_voting_code_and_legend_lines() {
        let page = PAGE
            .replace(" Y MADIGAN       P MOORE         E PARKE\n", "")
            .replace("N LANG", "NV LANG")
            .replace("</p>", "\n E - Denotes Excused Absence\n</p>");
        let profile = Jurisdiction::Il.profile();
        let rc = extract_roll_call(&page, VoteFormat::IlRollCallText, &profile, "91st")
            .unwrap()
            .found()
            .unwrap();

        let roster: Vec<(&str, VoteResponse)> = rc
            .roll_call
            .iter()
            .map(|e| (e.name.as_str(), e.response))
            .collect();
        assert_eq!(
            roster,
            [
                ("Acevedo", VoteResponse::Yea),
                ("De Leo", VoteResponse::Yea),
                ("Lang", VoteResponse::NotVoting),
            ]
        );
    }

    #[test]
    fn test_legend_cell_is_not_a_member() {
        let page = PAGE.replace(
            " Y MADIGAN       P MOORE         E PARKE",
            " Y MADIGAN       E - Denotes Excused Absence",
        );
        let profile = Jurisdiction::Il.profile();
        let rc = extract_roll_call(&page, VoteFormat::IlRollCallText, &profile, "91st")
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(rc.roll_call.len(), 4);
        assert!(rc.roll_call.iter().all(|e| !e.name.contains("Denotes")));
    }

    #[test]
    fn test_unknown_code() {
        let page = PAGE.replace("P MOORE", "X MOORE");
        let profile = Jurisdiction::Il.profile();
        let err = extract_roll_call(&page, VoteFormat::IlRollCallText, &profile, "91st").unwrap_err();
        let VoteError::UnexpectedResponse { code, .. } = err;
        assert_eq!(code, "X");
    }

    #[test]
    fn test_no_tally_block() {
        let profile = Jurisdiction::Il.profile();
        let result = extract_roll_call("<p>Roll call not available</p>", VoteFormat::IlRollCallText, &profile, "91st");
        assert!(!result.unwrap().is_found());
    }
}
