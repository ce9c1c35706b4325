//! Per-jurisdiction roll-call response codes.

use crate::types::{Jurisdiction, VoteResponse};

use super::VoteError;

type Entry = (&'static str, VoteResponse);

const AZ: &[Entry] = &[
    ("Y", VoteResponse::Yea),
    ("N", VoteResponse::Nay),
    ("AB", VoteResponse::Absent),
    ("NV", VoteResponse::NotVoting),
];

const GA: &[Entry] = &[
    ("Y", VoteResponse::Yea),
    ("N", VoteResponse::Nay),
    ("NV", VoteResponse::NotVoting),
    ("E", VoteResponse::Excused),
];

// IL roll calls print E for members who did not vote.
const IL: &[Entry] = &[
    ("Y", VoteResponse::Yea),
    ("N", VoteResponse::Nay),
    ("P", VoteResponse::Present),
    ("E", VoteResponse::NotVoting),
    ("NV", VoteResponse::NotVoting),
    ("A", VoteResponse::Absent),
];

const NV: &[Entry] = &[
    ("YEA", VoteResponse::Yea),
    ("NAY", VoteResponse::Nay),
    ("EXCUSED", VoteResponse::Excused),
    ("NOT VOTING", VoteResponse::NotVoting),
    ("ABSENT", VoteResponse::Absent),
];

// Journal section headers.
const SECTIONED: &[Entry] = &[
    ("YEAS", VoteResponse::Yea),
    ("AYES", VoteResponse::Yea),
    ("NAYS", VoteResponse::Nay),
    ("NOES", VoteResponse::Nay),
    ("PRESENT, NOT VOTING", VoteResponse::Present),
    ("PRESENT", VoteResponse::Present),
    ("ABSENT, EXCUSED", VoteResponse::Excused),
    ("ABSENT", VoteResponse::Absent),
    ("EXCUSED", VoteResponse::Excused),
    ("NOT VOTING", VoteResponse::NotVoting),
];

const GENERIC: &[Entry] = &[
    ("Y", VoteResponse::Yea),
    ("YEA", VoteResponse::Yea),
    ("N", VoteResponse::Nay),
    ("NAY", VoteResponse::Nay),
    ("A", VoteResponse::Absent),
    ("ABSENT", VoteResponse::Absent),
    ("NV", VoteResponse::NotVoting),
    ("NOT VOTING", VoteResponse::NotVoting),
    ("P", VoteResponse::Present),
    ("PRESENT", VoteResponse::Present),
    ("E", VoteResponse::Excused),
    ("EXCUSED", VoteResponse::Excused),
];

#[derive(Debug, Clone, Copy)]
pub struct ResponseVocabulary {
    jurisdiction: Jurisdiction,
    entries: &'static [Entry],
    headers: &'static [Entry],
}

impl ResponseVocabulary {
    pub fn for_jurisdiction(jurisdiction: Jurisdiction) -> Self {
        let entries = match jurisdiction {
            Jurisdiction::Az => AZ,
            Jurisdiction::Ga => GA,
            Jurisdiction::Il => IL,
            Jurisdiction::Nv => NV,
            Jurisdiction::Tx => SECTIONED,
            Jurisdiction::Pa | Jurisdiction::Ut | Jurisdiction::Wi => GENERIC,
        };
        Self {
            jurisdiction,
            entries,
            headers: SECTIONED,
        }
    }

    pub fn jurisdiction(&self) -> Jurisdiction {
        self.jurisdiction
    }

    /// Maps a roster code such as `NV` or `Not Voting` to a response.
    pub fn lookup(&self, code: &str) -> Result<VoteResponse, VoteError> {
        find(self.entries, code).ok_or_else(|| VoteError::UnexpectedResponse {
            jurisdiction: self.jurisdiction,
            code: code.trim().to_string(),
        })
    }

    /// Maps a journal section header such as `Present, not voting`.
    pub fn section(&self, header: &str) -> Result<VoteResponse, VoteError> {
        find(self.headers, header).ok_or_else(|| VoteError::UnexpectedResponse {
            jurisdiction: self.jurisdiction,
            code: header.trim().to_string(),
        })
    }
}

fn canonical(code: &str) -> String {
    code.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches([':', '.', '-'])
        .trim()
        .to_uppercase()
}

fn find(entries: &[Entry], code: &str) -> Option<VoteResponse> {
    let key = canonical(code);
    entries
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, response)| *response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_per_jurisdiction() {
        let ga = ResponseVocabulary::for_jurisdiction(Jurisdiction::Ga);
        assert_eq!(ga.lookup("NV").unwrap(), VoteResponse::NotVoting);
        assert_eq!(ga.lookup("E").unwrap(), VoteResponse::Excused);

        let az = ResponseVocabulary::for_jurisdiction(Jurisdiction::Az);
        assert_eq!(az.lookup("Y").unwrap(), VoteResponse::Yea);
        assert_eq!(az.lookup("AB").unwrap(), VoteResponse::Absent);

        let il = ResponseVocabulary::for_jurisdiction(Jurisdiction::Il);
        assert_eq!(il.lookup("E").unwrap(), VoteResponse::NotVoting);
        assert_eq!(il.lookup("NV").unwrap(), VoteResponse::NotVoting);

        let nv = ResponseVocabulary::for_jurisdiction(Jurisdiction::Nv);
        assert_eq!(nv.lookup("Not  Voting").unwrap(), VoteResponse::NotVoting);
        assert_eq!(nv.lookup("yea").unwrap(), VoteResponse::Yea);
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        let az = ResponseVocabulary::for_jurisdiction(Jurisdiction::Az);
        let err = az.lookup("X").unwrap_err();
        assert!(matches!(
            err,
            VoteError::UnexpectedResponse { jurisdiction: Jurisdiction::Az, ref code } if code == "X"
        ));
    }

    #[test]
    fn test_section_headers() {
        let tx = ResponseVocabulary::for_jurisdiction(Jurisdiction::Tx);
        assert_eq!(tx.section("Present, not voting").unwrap(), VoteResponse::Present);
        assert_eq!(tx.section("Absent, Excused:").unwrap(), VoteResponse::Excused);
        assert_eq!(tx.section("Nays").unwrap(), VoteResponse::Nay);
        assert!(tx.section("Paired").is_err());
    }
}
