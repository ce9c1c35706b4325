use std::{fmt::Display, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("Invalid jurisdiction '{0}'. Accepted values: AZ, GA, IL, NV, PA, TX, UT, WI")]
pub struct JurisdictionParseError(String);

#[derive(Debug, thiserror::Error)]
#[error("Invalid chamber '{0}'. Accepted values: 'H', 'S', 'A', 'house', 'senate', 'assembly'")]
pub struct ChamberParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Jurisdiction {
    Az,
    Ga,
    Il,
    Nv,
    Pa,
    Tx,
    Ut,
    Wi,
}

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 8] = [
        Jurisdiction::Az,
        Jurisdiction::Ga,
        Jurisdiction::Il,
        Jurisdiction::Nv,
        Jurisdiction::Pa,
        Jurisdiction::Tx,
        Jurisdiction::Ut,
        Jurisdiction::Wi,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Jurisdiction::Az => "AZ",
            Jurisdiction::Ga => "GA",
            Jurisdiction::Il => "IL",
            Jurisdiction::Nv => "NV",
            Jurisdiction::Pa => "PA",
            Jurisdiction::Tx => "TX",
            Jurisdiction::Ut => "UT",
            Jurisdiction::Wi => "WI",
        }
    }
}

impl FromStr for Jurisdiction {
    type Err = JurisdictionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Jurisdiction::ALL
            .into_iter()
            .find(|j| j.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| JurisdictionParseError(s.to_string()))
    }
}

impl Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Jurisdiction::Az => "Arizona",
            Jurisdiction::Ga => "Georgia",
            Jurisdiction::Il => "Illinois",
            Jurisdiction::Nv => "Nevada",
            Jurisdiction::Pa => "Pennsylvania",
            Jurisdiction::Tx => "Texas",
            Jurisdiction::Ut => "Utah",
            Jurisdiction::Wi => "Wisconsin",
        };
        write!(f, "{name}")
    }
}

/// Legislative body that took an action or held a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Chamber {
    #[serde(rename = "H")]
    House,
    #[serde(rename = "S")]
    Senate,
    #[serde(rename = "A")]
    Assembly,
}

impl Chamber {
    pub fn letter(&self) -> &'static str {
        match self {
            Chamber::House => "H",
            Chamber::Senate => "S",
            Chamber::Assembly => "A",
        }
    }

    /// Finds the chamber named in free text. Assembly wins over Senate, Senate over House.
    pub fn detect(text: &str) -> Option<Chamber> {
        let low = text.to_lowercase();
        if low.contains("assembly") {
            Some(Chamber::Assembly)
        } else if low.contains("senate") {
            Some(Chamber::Senate)
        } else if low.contains("house") {
            Some(Chamber::House)
        } else {
            None
        }
    }
}

impl FromStr for Chamber {
    type Err = ChamberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h" | "house" => Ok(Chamber::House),
            "s" | "senate" => Ok(Chamber::Senate),
            "a" | "assembly" => Ok(Chamber::Assembly),
            _ => Err(ChamberParseError(s.to_string())),
        }
    }
}

impl Display for Chamber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chamber::House => write!(f, "House"),
            Chamber::Senate => write!(f, "Senate"),
            Chamber::Assembly => write!(f, "Assembly"),
        }
    }
}

/// One-letter tag placed in front of history actions.
///
/// `Prior` marks actions that name no chamber on sites where the default is
/// "previous body" rather than a real chamber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChamberTag {
    House,
    Senate,
    Assembly,
    Prior,
}

impl ChamberTag {
    pub fn prefix(&self) -> &'static str {
        match self {
            ChamberTag::House => "H - ",
            ChamberTag::Senate => "S - ",
            ChamberTag::Assembly => "A - ",
            ChamberTag::Prior => "P - ",
        }
    }
}

impl From<Chamber> for ChamberTag {
    fn from(chamber: Chamber) -> Self {
        match chamber {
            Chamber::House => ChamberTag::House,
            Chamber::Senate => ChamberTag::Senate,
            Chamber::Assembly => ChamberTag::Assembly,
        }
    }
}

/// Result of looking for a structural anchor in a fetched document.
///
/// `NotFound` means the page has no such data (or its layout changed); it is
/// not an error and must not stop the other extractions for the same bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction<T> {
    Found(T),
    NotFound,
}

impl<T> Extraction<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Extraction::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Extraction::Found(value) => Some(value),
            Extraction::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        match self {
            Extraction::Found(value) => Extraction::Found(f(value)),
            Extraction::NotFound => Extraction::NotFound,
        }
    }
}

impl<T: Default> Extraction<T> {
    pub fn unwrap_or_default(self) -> T {
        self.found().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for Extraction<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Extraction::Found(v),
            None => Extraction::NotFound,
        }
    }
}

/// Identity fields shared by every output fragment of one bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BillKey {
    pub uuid: String,
    pub state: Jurisdiction,
    pub session: String,
    pub state_bill_id: String,
}

impl BillKey {
    /// Builds the synthetic uuid as state + session + bill id, with spaces removed.
    pub fn new(state: Jurisdiction, session: &str, state_bill_id: &str) -> Self {
        let uuid = format!("{}{}{}", state.code(), session, state_bill_id)
            .split_whitespace()
            .collect::<String>();
        Self {
            uuid,
            state,
            session: session.to_string(),
            state_bill_id: state_bill_id.to_string(),
        }
    }

    /// Case-insensitive match used by the query stage.
    pub fn matches(&self, filter: &BillFilter) -> bool {
        let eq = |want: &Option<String>, have: &str| {
            want.as_deref()
                .is_none_or(|w| w.trim().eq_ignore_ascii_case(have.trim()))
        };
        eq(&filter.uuid, &self.uuid)
            && eq(&filter.state, self.state.code())
            && eq(&filter.session, &self.session)
            && eq(&filter.state_bill_id, &self.state_bill_id)
    }
}

impl Display for BillKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.state_bill_id, self.session, self.uuid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillFilter {
    pub uuid: Option<String>,
    pub state: Option<String>,
    pub session: Option<String>,
    pub state_bill_id: Option<String>,
}

impl BillFilter {
    pub fn validate(self) -> Result<Self, String> {
        let by_parts = self.state.is_some() && self.session.is_some() && self.state_bill_id.is_some();
        if self.uuid.is_none() && !by_parts {
            return Err(
                "Provide either a uuid or all of state, session and state_bill_id".to_string(),
            );
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BillRecord {
    #[serde(flatten)]
    pub key: BillKey,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub state_url: String,
}

impl Display for BillRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "┌─ {} ─ {}", self.key.state, self.key)?;
        writeln!(f, "│  Title:  {}", self.title)?;
        if let Some(status) = &self.status {
            writeln!(f, "│  Status: {}", status)?;
        }
        write!(f, "└─ {}", self.state_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryEntry {
    /// `YYYY-MM-DD`, or the raw date text when it could not be parsed.
    pub date: String,
    pub action: String,
}

impl Display for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<10}  {}", self.date, self.action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BillHistory {
    #[serde(flatten)]
    pub key: BillKey,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SponsorType {
    Sponsor,
    Cosponsor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SponsorEntry {
    pub sponsor_name: String,
    pub sponsor_type: SponsorType,
}

impl Display for SponsorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.sponsor_type {
            SponsorType::Sponsor => "sponsor",
            SponsorType::Cosponsor => "cosponsor",
        };
        write!(f, "{} ({})", self.sponsor_name, kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BillSponsors {
    #[serde(flatten)]
    pub key: BillKey,
    pub sponsors: Vec<SponsorEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum VoteResponse {
    Yea,
    Nay,
    Absent,
    #[serde(rename = "Not Voting")]
    NotVoting,
    Present,
    Excused,
}

impl VoteResponse {
    pub fn label(&self) -> &'static str {
        match self {
            VoteResponse::Yea => "Yea",
            VoteResponse::Nay => "Nay",
            VoteResponse::Absent => "Absent",
            VoteResponse::NotVoting => "Not Voting",
            VoteResponse::Present => "Present",
            VoteResponse::Excused => "Excused",
        }
    }
}

impl Display for VoteResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RollCallEntry {
    pub name: String,
    pub response: VoteResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VoteRecord {
    #[serde(flatten)]
    pub key: BillKey,
    pub chamber: Chamber,
    pub date: String,
    pub description: String,
    pub yeas: u32,
    pub nays: u32,
    pub other: u32,
    pub roll_call: Vec<RollCallEntry>,
}

impl Display for VoteRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "┌─ {} ─ {} ─ {}",
            self.chamber, self.date, self.description
        )?;
        writeln!(
            f,
            "│  Yeas: {} · Nays: {} · Other: {}",
            self.yeas, self.nays, self.other
        )?;
        write!(f, "└─ {} member(s) on the roll", self.roll_call.len())
    }
}
