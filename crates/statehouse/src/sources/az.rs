//! Arizona Legislature REST API (`apps.azleg.gov/api`).

use serde::Deserialize;

use super::SourceError;
use crate::{
    history::{RawEntry, finalize},
    jurisdiction::JurisdictionProfile,
    sponsors::{RawSponsor, classify_sponsors},
    types::{BillKey, BillRecord, Chamber, HistoryEntry, RollCallEntry, SponsorEntry, VoteRecord},
    votes::{RollCall, Tally},
};

pub const API_BASE: &str = "https://apps.azleg.gov/api";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzSession {
    pub name: String,
    pub session_id: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzBill {
    pub bill_id: u64,
    pub short_title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzStatusAction {
    pub date_type: String,
    pub body: String,
    pub bill_status_action_id: u64,
    pub sorted_date: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzLegislator {
    pub member_short_name: String,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzSponsor {
    pub sponsor_type: String,
    pub legislator: AzLegislator,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzVote {
    pub vote: String,
    pub legislator: AzLegislator,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzFloorAction {
    pub committee_name: String,
    pub report_date: String,
    #[serde(default)]
    pub ayes: u32,
    #[serde(default)]
    pub nays: u32,
    #[serde(default)]
    pub absent: u32,
    #[serde(default)]
    pub not_voting: u32,
    #[serde(default)]
    pub present: u32,
    #[serde(default)]
    pub excused: u32,
    #[serde(default)]
    pub vacant: u32,
    #[serde(default)]
    pub votes: Vec<AzVote>,
}

/// Looks up the numeric id the API uses for a session name such as
/// `1995 - Forty-second Legislature - First Regular Session`.
pub fn session_id(sessions: &[AzSession], name: &str) -> Result<u32, SourceError> {
    sessions
        .iter()
        .find(|s| s.name.trim() == name.trim())
        .map(|s| s.session_id)
        .ok_or_else(|| SourceError::UnknownSession(name.to_string()))
}

/// Every session the API knows, as `[{"Name": ..., "SessionId": ...}]`.
pub fn sessions_url() -> String {
    format!("{API_BASE}/Session/")
}

pub fn bill_url(state_bill_id: &str, session_id: u32) -> String {
    format!("{API_BASE}/Bill/?billNumber={state_bill_id}&sessionId={session_id}")
}

pub fn status_overview_url(state_bill_id: &str, session_id: u32) -> String {
    format!("{API_BASE}/BillStatusOverview/?billNumber={state_bill_id}&sessionId={session_id}")
}

pub fn sponsors_url(bill_id: u64) -> String {
    format!("{API_BASE}/BillSponsor/?id={bill_id}")
}

pub fn floor_action_url(bill_id: u64, action_id: u64) -> String {
    format!(
        "{API_BASE}/BillStatusFloorAction/?billStatusId={bill_id}&billStatusActionId={action_id}&includeVotes=true"
    )
}

/// Public page for humans, recorded as `state_url`.
pub fn overview_page_url(bill_id: u64, session_id: u32) -> String {
    format!("https://apps.azleg.gov/BillStatus/BillOverview/{bill_id}?SessionId={session_id}")
}

fn body_name(body: &str) -> &str {
    match body {
        "H" => "House",
        "S" => "Senate",
        other => other,
    }
}

fn date_type_label(date_type: &str) -> &str {
    match date_type {
        "FINAL" => "Final Passage",
        "THIRD" => "Third Reading",
        "SECOND" => "Second Reading",
        "FIRST" => "First Reading",
        other => other,
    }
}

/// `House: Final Passage`, as the status overview describes an action.
pub fn action_text(action: &AzStatusAction) -> String {
    format!("{}: {}", body_name(&action.body), date_type_label(&action.date_type))
}

pub fn history(actions: &[AzStatusAction], profile: &JurisdictionProfile) -> Vec<HistoryEntry> {
    let raw = actions
        .iter()
        .map(|a| RawEntry::new(a.sorted_date.as_str(), action_text(a), body_name(&a.body)))
        .collect();
    finalize(raw, profile)
}

/// Status for the metadata record: the last action in API order.
pub fn last_status(actions: &[AzStatusAction]) -> Option<String> {
    actions.last().map(action_text)
}

pub fn sponsors(list: &[AzSponsor], profile: &JurisdictionProfile) -> Vec<SponsorEntry> {
    let raw = list
        .iter()
        .map(|s| RawSponsor {
            prime: s.sponsor_type.contains("Prime"),
            ..RawSponsor::named(s.legislator.member_short_name.as_str())
        })
        .collect();
    classify_sponsors(raw, profile.sponsor_rule)
}

pub fn metadata(bill: &AzBill, key: BillKey, status: Option<String>, session_id: u32) -> BillRecord {
    BillRecord {
        key,
        title: bill.short_title.clone(),
        description: bill.description.clone(),
        status,
        state_url: overview_page_url(bill.bill_id, session_id),
    }
}

/// Converts a floor action into a vote record. Actions without recorded votes yield `None`.
pub fn vote(
    floor: &AzFloorAction,
    key: BillKey,
    profile: &JurisdictionProfile,
) -> Result<Option<VoteRecord>, SourceError> {
    let Some(first) = floor.votes.first() else {
        return Ok(None);
    };
    let vocabulary = profile.vocabulary();
    let roll_call = floor
        .votes
        .iter()
        .map(|v| {
            Ok(RollCallEntry {
                name: v.legislator.member_short_name.clone(),
                response: vocabulary.lookup(&v.vote)?,
            })
        })
        .collect::<Result<Vec<_>, SourceError>>()?;

    let roll_call = RollCall {
        printed: Some(Tally {
            yeas: floor.ayes,
            nays: floor.nays,
            other: floor.absent + floor.not_voting + floor.present + floor.excused + floor.vacant,
        }),
        roll_call,
        date: Some(profile.dates.normalize(&floor.report_date)),
        chamber: first.legislator.body.as_deref().and_then(|b| b.parse::<Chamber>().ok()),
        description: Some(floor.committee_name.clone()),
    };
    Ok(Some(roll_call.into_record(key, None, profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actions::ActionTag,
        types::{Jurisdiction, SponsorType, VoteResponse},
    };

    fn key() -> BillKey {
        BillKey::new(Jurisdiction::Az, "1995 - Forty-second Legislature - First Regular Session", "HB2020")
    }

    #[test]
    fn test_status_overview() {
        let actions: Vec<AzStatusAction> = serde_json::from_str(
            r#"[
                {"DateType": "FIRST", "Body": "H", "BillStatusActionId": 11, "SortedDate": "1995-01-12T00:00:00"},
                {"DateType": "THIRD", "Body": "H", "BillStatusActionId": 12, "SortedDate": "1995-02-20T00:00:00"},
                {"DateType": "FINAL", "Body": "S", "BillStatusActionId": 13, "SortedDate": "1995-03-30T00:00:00"}
            ]"#,
        )
        .unwrap();
        let profile = Jurisdiction::Az.profile();

        let history = history(&actions, &profile);
        assert_eq!(history[0].date, "1995-01-12");
        assert_eq!(history[0].action, "H - House: First Reading");
        assert_eq!(history[2].action, "S - Senate: Final Passage");
        assert_eq!(last_status(&actions).as_deref(), Some("Senate: Final Passage"));

        let table = profile.actions();
        assert!(table.classify(&actions[1].date_type).has(ActionTag::Reading3));
    }

    #[test]
    fn test_prime_sponsor() {
        let list: Vec<AzSponsor> = serde_json::from_str(
            r#"[
                {"SponsorType": "Prime", "Legislator": {"MemberShortName": "GRAHAM"}},
                {"SponsorType": "Co-Sponsor", "Legislator": {"MemberShortName": "BURNS"}}
            ]"#,
        )
        .unwrap();
        let sponsors = sponsors(&list, &Jurisdiction::Az.profile());
        assert_eq!(sponsors[0].sponsor_type, SponsorType::Sponsor);
        assert_eq!(sponsors[1].sponsor_name, "BURNS");
        assert_eq!(sponsors[1].sponsor_type, SponsorType::Cosponsor);
    }

    #[test]
    fn test_floor_action_vote() {
        let floor: Vec<AzFloorAction> = serde_json::from_str(
            r#"[{
                "CommitteeName": "THIRD READING", "ReportDate": "1995-02-20T00:00:00",
                "Ayes": 2, "Nays": 1, "Absent": 0, "NotVoting": 1, "Present": 0, "Excused": 0, "Vacant": 0,
                "Votes": [
                    {"Vote": "Y", "Legislator": {"MemberShortName": "GRAHAM", "Body": "H"}},
                    {"Vote": "Y", "Legislator": {"MemberShortName": "BURNS", "Body": "H"}},
                    {"Vote": "N", "Legislator": {"MemberShortName": "SMITH", "Body": "H"}},
                    {"Vote": "NV", "Legislator": {"MemberShortName": "JONES", "Body": "H"}}
                ]
            }]"#,
        )
        .unwrap();
        let record = vote(&floor[0], key(), &Jurisdiction::Az.profile()).unwrap().unwrap();
        assert_eq!(record.chamber, Chamber::House);
        assert_eq!(record.date, "1995-02-20");
        assert_eq!(record.description, "THIRD READING");
        assert_eq!((record.yeas, record.nays, record.other), (2, 1, 1));
        assert_eq!(record.roll_call[3].response, VoteResponse::NotVoting);
    }

    #[test]
    fn test_floor_action_without_votes() {
        let floor: AzFloorAction =
            serde_json::from_str(r#"{"CommitteeName": "COW", "ReportDate": "1995-02-19T00:00:00", "Votes": []}"#)
                .unwrap();
        assert!(vote(&floor, key(), &Jurisdiction::Az.profile()).unwrap().is_none());
    }

    #[test]
    fn test_unexpected_vote_code() {
        let floor: AzFloorAction = serde_json::from_str(
            r#"{"CommitteeName": "FINAL", "ReportDate": "1995-03-30T00:00:00",
                "Votes": [{"Vote": "P", "Legislator": {"MemberShortName": "GRAHAM", "Body": "S"}}]}"#,
        )
        .unwrap();
        let err = vote(&floor, key(), &Jurisdiction::Az.profile()).unwrap_err();
        assert!(matches!(err, SourceError::Vote(_)));
    }

    #[test]
    fn test_session_lookup() {
        let sessions: Vec<AzSession> =
            serde_json::from_str(r#"[{"Name": "2001 - Forty-fifth Legislature - First Regular Session", "SessionId": 63}]"#)
                .unwrap();
        assert_eq!(session_id(&sessions, "2001 - Forty-fifth Legislature - First Regular Session").unwrap(), 63);
        assert!(session_id(&sessions, "1901").is_err());
    }
}
