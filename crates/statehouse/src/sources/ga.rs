//! Georgia General Assembly legislation service records.

use serde::Deserialize;

use super::SourceError;
use crate::{
    history::{RawEntry, finalize},
    jurisdiction::JurisdictionProfile,
    sponsors::{RawSponsor, classify_sponsors},
    types::{BillKey, BillRecord, Chamber, HistoryEntry, Jurisdiction, RollCallEntry, SponsorEntry, VoteRecord},
    votes::{RollCall, Tally},
};

/// Session names and the site ids the legislation service expects.
pub const SESSION_SITE_IDS: &[(&str, u32)] = &[
    ("2023_24", 1031),
    ("2021_ss", 1030),
    ("2021_22", 1029),
    ("2020_ss", 1027),
    ("2019_20", 27),
    ("2018_ss", 26),
    ("2017_18", 25),
    ("2015_16", 24),
    ("2013_14", 23),
    ("2011_ss", 22),
    ("2011_12", 21),
    ("2009_10", 20),
    ("2007_08", 18),
    ("2005_06", 14),
    ("2003_04", 11),
    ("2001_02", 1),
];

pub fn session_site_id(session: &str) -> Result<u32, SourceError> {
    SESSION_SITE_IDS
        .iter()
        .find(|(name, _)| *name == session.trim())
        .map(|(_, id)| *id)
        .ok_or_else(|| SourceError::UnknownSession(session.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GaStatus {
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GaStatusEvent {
    pub date: String,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GaAuthor {
    pub member_description: String,
    pub sequence: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GaInstrument {
    pub id: u64,
    pub document_type: String,
    pub number: u32,
    pub caption: String,
    pub status: GaStatus,
    #[serde(default)]
    pub authors: Vec<GaAuthor>,
    #[serde(default)]
    pub status_history: Vec<GaStatusEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GaMember {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GaMemberVote {
    pub member: GaMember,
    pub member_voted: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GaRollCall {
    pub branch: String,
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub yeas: u32,
    #[serde(default)]
    pub nays: u32,
    #[serde(default)]
    pub not_voting: u32,
    #[serde(default)]
    pub excused: u32,
    #[serde(default)]
    pub votes: Vec<GaMemberVote>,
}

impl GaInstrument {
    /// `HB 123`
    pub fn state_bill_id(&self) -> String {
        format!("{} {}", self.document_type, self.number)
    }

    pub fn key(&self, session: &str) -> BillKey {
        BillKey::new(Jurisdiction::Ga, session, &self.state_bill_id())
    }

    pub fn state_url(&self) -> String {
        format!("https://www.legis.ga.gov/legislation/{}", self.id)
    }
}

/// Status codes open with the acting chamber (`HFR`, `SPA`); mixed-case codes such as `Signed Gov` do not.
fn code_chamber(code: &str) -> &'static str {
    if code.chars().any(|c| c.is_ascii_lowercase()) {
        return "";
    }
    match code.chars().next() {
        Some('H') => "House",
        Some('S') => "Senate",
        _ => "",
    }
}

pub fn metadata(instrument: &GaInstrument, session: &str) -> BillRecord {
    BillRecord {
        key: instrument.key(session),
        title: instrument.caption.clone(),
        description: Some(instrument.caption.clone()),
        status: Some(instrument.status.description.clone()),
        state_url: instrument.state_url(),
    }
}

pub fn history(events: &[GaStatusEvent], profile: &JurisdictionProfile) -> Vec<HistoryEntry> {
    let raw = events
        .iter()
        .map(|e| RawEntry::new(e.date.as_str(), e.description.as_str(), code_chamber(&e.code)))
        .collect();
    finalize(raw, profile)
}

pub fn sponsors(authors: &[GaAuthor], profile: &JurisdictionProfile) -> Vec<SponsorEntry> {
    let raw = authors
        .iter()
        .map(|a| RawSponsor {
            sequence: Some(a.sequence),
            ..RawSponsor::named(a.member_description.as_str())
        })
        .collect();
    classify_sponsors(raw, profile.sponsor_rule)
}

pub fn vote(roll_call: &GaRollCall, key: BillKey, profile: &JurisdictionProfile) -> Result<VoteRecord, SourceError> {
    let vocabulary = profile.vocabulary();
    let entries = roll_call
        .votes
        .iter()
        .map(|v| {
            Ok(RollCallEntry {
                name: v.member.name.trim().to_string(),
                response: vocabulary.lookup(&v.member_voted)?,
            })
        })
        .collect::<Result<Vec<_>, SourceError>>()?;

    let parsed = RollCall {
        printed: Some(Tally {
            yeas: roll_call.yeas,
            nays: roll_call.nays,
            other: roll_call.not_voting + roll_call.excused,
        }),
        roll_call: entries,
        date: Some(profile.dates.normalize(&roll_call.date)),
        chamber: roll_call.branch.parse::<Chamber>().ok(),
        description: Some(roll_call.description.clone()),
    };
    Ok(parsed.into_record(key, None, profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actions::ActionTag,
        types::{SponsorType, VoteResponse},
    };

    const INSTRUMENT: &str = r#"{
        "Id": 4512, "DocumentType": "HB", "Number": 123,
        "Caption": "Education; school fees; provisions",
        "Status": {"Description": "Effective Date"},
        "Authors": [
            {"MemberDescription": "Smith, Lynn 70th", "Sequence": 2},
            {"MemberDescription": "Coleman, Brooks 97th", "Sequence": 1}
        ],
        "StatusHistory": [
            {"Date": "2001-01-10T00:00:00", "Code": "HFR", "Description": "House First Readers"},
            {"Date": "2001-01-09T00:00:00", "Code": "HPF", "Description": "House Prefiled"},
            {"Date": "2001-03-01T00:00:00", "Code": "SPA", "Description": "Senate Passed/Adopted"},
            {"Date": "2001-04-20T00:00:00", "Code": "Signed Gov", "Description": "Signed by Governor"}
        ]
    }"#;

    #[test]
    fn test_instrument_records() {
        let instrument: GaInstrument = serde_json::from_str(INSTRUMENT).unwrap();
        let profile = Jurisdiction::Ga.profile();

        let record = metadata(&instrument, "2001_02");
        assert_eq!(record.key.state_bill_id, "HB 123");
        assert_eq!(record.key.uuid, "GA2001_02HB123");
        assert_eq!(record.status.as_deref(), Some("Effective Date"));
        assert_eq!(record.state_url, "https://www.legis.ga.gov/legislation/4512");

        let history = history(&instrument.status_history, &profile);
        let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            [
                "H - House Prefiled",
                "H - House First Readers",
                "S - Senate Passed/Adopted",
                "H - Signed by Governor",
            ]
        );

        let table = profile.actions();
        assert!(table.classify(&instrument.status_history[0].code).has(ActionTag::Reading1));
        assert!(table.classify(&instrument.status_history[3].code).has(ActionTag::ExecutiveSignature));
    }

    #[test]
    fn test_authors_by_sequence() {
        let instrument: GaInstrument = serde_json::from_str(INSTRUMENT).unwrap();
        let sponsors = sponsors(&instrument.authors, &Jurisdiction::Ga.profile());
        assert_eq!(sponsors[0].sponsor_name, "Smith, Lynn");
        assert_eq!(sponsors[0].sponsor_type, SponsorType::Cosponsor);
        assert_eq!(sponsors[1].sponsor_name, "Coleman, Brooks");
        assert_eq!(sponsors[1].sponsor_type, SponsorType::Sponsor);
    }

    #[test]
    fn test_roll_call() {
        let roll_call: GaRollCall = serde_json::from_str(
            r#"{
                "Branch": "Senate", "Date": "2001-03-01T10:15:00", "Description": "HB 123 - Third Reading",
                "Yeas": 2, "Nays": 0, "NotVoting": 1, "Excused": 1,
                "Votes": [
                    {"Member": {"Name": "Balfour"}, "MemberVoted": "Y"},
                    {"Member": {"Name": "Hooks"}, "MemberVoted": "Y"},
                    {"Member": {"Name": "Tate"}, "MemberVoted": "NV"},
                    {"Member": {"Name": "Unterman"}, "MemberVoted": "E"}
                ]
            }"#,
        )
        .unwrap();
        let key = BillKey::new(Jurisdiction::Ga, "2001_02", "HB 123");
        let record = vote(&roll_call, key, &Jurisdiction::Ga.profile()).unwrap();
        assert_eq!(record.chamber, Chamber::Senate);
        assert_eq!(record.date, "2001-03-01");
        assert_eq!(record.roll_call[2].response, VoteResponse::NotVoting);
        assert_eq!(record.roll_call[3].response, VoteResponse::Excused);
        assert_eq!((record.yeas, record.nays, record.other), (2, 0, 2));
    }

    #[test]
    fn test_site_ids() {
        assert_eq!(session_site_id("2001_02").unwrap(), 1);
        assert!(session_site_id("1999_00").is_err());
    }
}
