use std::sync::LazyLock;

use regex::Regex;

use super::{RollCall, Tally, VoteError, page_date};
use crate::{
    jurisdiction::JurisdictionProfile,
    types::{Chamber, Extraction, RollCallEntry},
    utils::{document_text, normalize_whitespace},
};

// Longer headers first so `Present, not voting` is not read as `Present`.
static RE_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?im)^[ \t]*(yeas|ayes|nays|noes|present,\s*not\s+voting|present",
        r"|absent,\s*excused|absent|excused|not\s+voting)[ \t]*(?:—|–|-|:)",
    ))
    .expect("invalid regex: section header")
});
static RE_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+(yeas|ayes|nays|noes|present)\b").expect("invalid regex: printed count")
});
static RE_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bon\s+((?:second|third|final)\s+(?:reading|passage))").expect("invalid regex: question")
});
static RE_BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("invalid regex: blank line"));
static RE_SEMICOLON_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";|\n|\s{2,}").expect("invalid regex: semicolon split"));
static RE_COMMA_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\n|\s{2,}").expect("invalid regex: comma split"));
static RE_TRAILING_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\.?\s*$").expect("invalid regex: trailing note"));
static RE_ENDS_WITH_INITIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s,])[A-Z]\.$").expect("invalid regex: initial"));
static RE_MEMBER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Za-z'.\-]*(?:(?:\s+|,\s*)[A-Z][A-Za-z'.\-]*)*$").expect("invalid regex: member name")
});

fn split_names(body: &str) -> Vec<String> {
    let splitter = if body.contains(';') {
        &*RE_SEMICOLON_SPLIT
    } else {
        &*RE_COMMA_SPLIT
    };
    splitter
        .split(body)
        .filter_map(|raw| {
            let name = normalize_whitespace(raw);
            let name = RE_TRAILING_NOTE.replace(&name, "").into_owned();
            let name = if name.ends_with('.') && !RE_ENDS_WITH_INITIAL.is_match(&name) {
                name.trim_end_matches('.').to_string()
            } else {
                name
            };
            RE_MEMBER_NAME.is_match(&name).then_some(name)
        })
        .collect()
}

/// Journal prose: a `147 Yeas, 0 Nays, 1 Present, not voting.` line and `Yeas — A; B; C.` sections.
pub(super) fn journal_text(body: &str, profile: &JurisdictionProfile) -> Result<Extraction<RollCall>, VoteError> {
    let text = document_text(body);
    let vocabulary = profile.vocabulary();

    let printed = text.lines().find(|line| RE_COUNT.is_match(line)).map(|line| {
        RE_COUNT
            .captures_iter(line)
            .fold(Tally::default(), |mut tally, caps| {
                let count = caps[1].parse::<u32>().unwrap_or(0);
                match caps[2].to_lowercase().as_str() {
                    "yeas" | "ayes" => tally.yeas += count,
                    "nays" | "noes" => tally.nays += count,
                    _ => tally.other += count,
                }
                tally
            })
    });

    let headers: Vec<_> = RE_SECTION.captures_iter(&text).collect();
    let mut roll_call = Vec::new();
    for (i, caps) in headers.iter().enumerate() {
        let (Some(label), Some(whole)) = (caps.get(1), caps.get(0)) else {
            continue;
        };
        let response = vocabulary.section(label.as_str())?;
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let section = &text[whole.end()..end];
        let section = RE_BLANK_LINE
            .find(section)
            .map_or(section, |m| &section[..m.start()]);
        roll_call.extend(
            split_names(section)
                .into_iter()
                .map(|name| RollCallEntry { name, response }),
        );
    }

    if printed.is_none() && roll_call.is_empty() {
        return Ok(Extraction::NotFound);
    }

    let chamber = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .and_then(Chamber::detect);
    let description = RE_QUESTION
        .captures(&text)
        .map(|caps| format!("On {}", normalize_whitespace(&caps[1].to_lowercase())));

    Ok(Extraction::Found(RollCall {
        printed,
        roll_call,
        date: page_date(&text, profile),
        chamber,
        description,
    }))
}

#[cfg(test)]
mod tests {
    use super::split_names;
    use crate::{
        types::{Chamber, Extraction, Jurisdiction, VoteResponse},
        votes::{TallyPolicy, VoteFormat, extract_roll_call},
    };

    const JOURNAL: &str = "HOUSE JOURNAL
FORTY-SEVENTH DAY — THURSDAY, APRIL 9, 2009
HB 205 ON THIRD READING (by Aycock)
HB 205, A bill to be entitled An Act relating to the restraint of certain dogs.
HB 205 was passed by (Record 146): 5 Yeas, 2 Nays, 1 Present, not voting.
Yeas — Allen; Alonzo; Anchia; Brown, F.; Aycock(C).
Nays — Farias; Farrar.
Present, not voting — Castro.
Absent — Pierson.

All Members are deemed to have voted.
";

    #[test]
    fn test_sectioned_journal() {
        let profile = Jurisdiction::Tx.profile();
        let rc = extract_roll_call(JOURNAL, VoteFormat::SectionedText, &profile, "81R")
            .unwrap()
            .found()
            .unwrap();

        assert_eq!(rc.chamber, Some(Chamber::House));
        assert_eq!(rc.date.as_deref(), Some("2009-04-09"));
        assert_eq!(rc.description.as_deref(), Some("On third reading"));

        let names: Vec<&str> = rc.roll_call.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            ["Allen", "Alonzo", "Anchia", "Brown, F.", "Aycock", "Farias", "Farrar", "Castro", "Pierson"]
        );
        assert_eq!(rc.roll_call[7].response, VoteResponse::Present);
        assert_eq!(rc.roll_call[8].response, VoteResponse::Absent);

        let printed = rc.printed.unwrap();
        assert_eq!((printed.yeas, printed.nays, printed.other), (5, 2, 1));

        let tally = rc.tally(TallyPolicy::DeriveFromRoster);
        assert_eq!((tally.yeas, tally.nays, tally.other), (5, 2, 2));
    }

    #[test]
    fn test_split_names() {
        assert_eq!(split_names(" Smith, Jones, Garcia.\n"), ["Smith", "Jones", "Garcia"]);
        assert_eq!(split_names("Smith; all others present"), ["Smith"]);
    }

    #[test]
    fn test_viva_voce_has_no_roll_call() {
        let profile = Jurisdiction::Tx.profile();
        let text = "SB 212 (Shapleigh) passed by a viva voce vote.";
        assert_eq!(
            extract_roll_call(text, VoteFormat::SectionedText, &profile, "81R").unwrap(),
            Extraction::NotFound
        );
    }
}
