//! Roll-call vote extraction.
//!
//! A vote page yields a [`RollCall`]: the tally printed on the page (when
//! there is one), the member roster, and whatever date/chamber/description the
//! page states. [`RollCall::into_record`] fills the gaps from the vote link and
//! the jurisdiction profile and settles the tally according to the
//! jurisdiction's [`TallyPolicy`].

mod illinois;
mod nevada;
mod sectioned;
pub mod vocabulary;

use std::{fmt::Display, str::FromStr, sync::LazyLock};

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::{
    dates::find_date_token,
    jurisdiction::JurisdictionProfile,
    types::{BillKey, Chamber, Extraction, Jurisdiction, RollCallEntry, VoteRecord, VoteResponse},
    utils::{normalize_whitespace, resolve_url, stripped_text},
};

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("unexpected response '{code}' in a {jurisdiction} roll call")]
    UnexpectedResponse {
        jurisdiction: Jurisdiction,
        code: String,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid vote format '{0}'. Accepted values: nv-tables, il-roll-call-text, sectioned-text")]
pub struct VoteFormatParseError(String);

/// Roll-call page layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoteFormat {
    /// Nevada: `<font size="+2">` header, summary table, then a name/response roster table.
    NvTables,
    /// Illinois: fixed-width text with a `N YEAS N NAYS N PRESENT` line and `CODE NAME` cells.
    IlRollCallText,
    /// Journal prose with `Yeas —`, `Nays —`, `Present, not voting —` sections.
    SectionedText,
}

impl VoteFormat {
    pub const ALL: [VoteFormat; 3] = [
        VoteFormat::NvTables,
        VoteFormat::IlRollCallText,
        VoteFormat::SectionedText,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            VoteFormat::NvTables => "nv-tables",
            VoteFormat::IlRollCallText => "il-roll-call-text",
            VoteFormat::SectionedText => "sectioned-text",
        }
    }

    pub fn for_jurisdiction(jurisdiction: Jurisdiction) -> Option<VoteFormat> {
        match jurisdiction {
            Jurisdiction::Nv => Some(VoteFormat::NvTables),
            Jurisdiction::Il => Some(VoteFormat::IlRollCallText),
            Jurisdiction::Tx => Some(VoteFormat::SectionedText),
            _ => None,
        }
    }
}

impl FromStr for VoteFormat {
    type Err = VoteFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoteFormat::ALL
            .into_iter()
            .find(|f| f.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VoteFormatParseError(s.to_string()))
    }
}

impl Display for VoteFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Which count wins when the printed tally and the roster disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyPolicy {
    /// Keep the page's numbers and log the disagreement.
    TrustPage,
    /// Recount from the roster; the printed tally is used only when there is no roster.
    DeriveFromRoster,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub yeas: u32,
    pub nays: u32,
    pub other: u32,
}

impl Tally {
    pub fn from_roster(roster: &[RollCallEntry]) -> Self {
        roster.iter().fold(Tally::default(), |mut tally, entry| {
            match entry.response {
                VoteResponse::Yea => tally.yeas += 1,
                VoteResponse::Nay => tally.nays += 1,
                _ => tally.other += 1,
            }
            tally
        })
    }
}

impl Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.yeas, self.nays, self.other)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollCall {
    pub printed: Option<Tally>,
    pub roll_call: Vec<RollCallEntry>,
    pub date: Option<String>,
    pub chamber: Option<Chamber>,
    pub description: Option<String>,
}

impl RollCall {
    pub fn roster_tally(&self) -> Tally {
        Tally::from_roster(&self.roll_call)
    }

    /// True when there is nothing to compare or the printed tally matches the roster.
    pub fn is_consistent(&self) -> bool {
        match self.printed {
            Some(printed) => self.roll_call.is_empty() || printed == self.roster_tally(),
            None => true,
        }
    }

    pub fn tally(&self, policy: TallyPolicy) -> Tally {
        let roster = self.roster_tally();
        match (self.printed, policy) {
            (None, _) => roster,
            (Some(printed), _) if self.roll_call.is_empty() => printed,
            (Some(_), TallyPolicy::DeriveFromRoster) => roster,
            (Some(printed), TallyPolicy::TrustPage) => {
                if printed != roster {
                    log::warn!(
                        "Printed tally {} does not match roster {} ({} members)",
                        printed,
                        roster,
                        self.roll_call.len()
                    );
                }
                printed
            }
        }
    }

    pub fn into_record(self, key: BillKey, link: Option<&VoteLink>, profile: &JurisdictionProfile) -> VoteRecord {
        let tally = self.tally(profile.tally_policy);
        let chamber = self
            .chamber
            .or_else(|| link.and_then(|l| l.chamber))
            .unwrap_or(profile.default_vote_chamber);
        let date = self
            .date
            .or_else(|| link.and_then(|l| l.date.clone()))
            .unwrap_or_default();
        let description = self
            .description
            .filter(|d| !d.is_empty())
            .or_else(|| link.map(|l| l.description.clone()))
            .unwrap_or_default();

        VoteRecord {
            key,
            chamber,
            date,
            description,
            yeas: tally.yeas,
            nays: tally.nays,
            other: tally.other,
            roll_call: self.roll_call,
        }
    }
}

/// Extracts one roll call. An unrecognised response code fails the whole vote.
pub fn extract_roll_call(
    body: &str,
    format: VoteFormat,
    profile: &JurisdictionProfile,
    session: &str,
) -> Result<Extraction<RollCall>, VoteError> {
    let roll_call = match format {
        VoteFormat::NvTables => nevada::tables(body, profile, session)?,
        VoteFormat::IlRollCallText => illinois::roll_call_text(body, profile)?,
        VoteFormat::SectionedText => sectioned::journal_text(body, profile)?,
    };
    if let Extraction::Found(rc) = &roll_call
        && !rc.is_consistent()
    {
        log::debug!(
            "[{}] printed tally {:?} differs from roster {}",
            format,
            rc.printed,
            rc.roster_tally()
        );
    }
    Ok(roll_call)
}

/// A link from a bill page to one of its roll calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteLink {
    pub url: String,
    pub chamber: Option<Chamber>,
    pub description: String,
    pub date: Option<String>,
}

static NV_VOTE_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href*='BillVote.cfm?VoteID=']").expect("invalid selector: nv vote link")
});
static ANY_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("invalid selector: a[href]"));
static RE_LINK_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").expect("invalid regex: link date"));

fn link_url(base_url: &str, href: &str) -> Option<String> {
    resolve_url(base_url, href)
        .inspect_err(|e| log::debug!("Skipping vote link {:?} on {}: {}", href, base_url, e))
        .ok()
}

/// Finds the roll-call links on a bill page.
///
/// Journals ([`VoteFormat::SectionedText`]) print the roll call in the page
/// itself and have no links to follow.
pub fn find_vote_links(html: &str, base_url: &str, format: VoteFormat) -> Vec<VoteLink> {
    let document = Html::parse_document(html);
    match format {
        VoteFormat::NvTables => document
            .select(&NV_VOTE_LINK_SELECTOR)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                let text = stripped_text(a);
                let (first, rest) = text.split_once(' ').unwrap_or((text.as_str(), ""));
                let first = first.to_lowercase();
                let chamber = if first.starts_with("assembly") {
                    Some(Chamber::Assembly)
                } else if first.starts_with("senate") {
                    Some(Chamber::Senate)
                } else {
                    None
                };
                Some(VoteLink {
                    url: link_url(base_url, href)?,
                    chamber,
                    description: rest.trim().to_string(),
                    date: None,
                })
            })
            .collect(),
        VoteFormat::IlRollCallText => document
            .select(&ANY_LINK_SELECTOR)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                let text = stripped_text(a);
                let raw_date = RE_LINK_DATE.find(&text)?;
                let description = normalize_whitespace(&text.replace(raw_date.as_str(), ""));
                Some(VoteLink {
                    url: link_url(base_url, href)?,
                    chamber: Chamber::detect(&description),
                    date: Some(crate::dates::normalize_date(raw_date.as_str())),
                    description,
                })
            })
            .collect(),
        VoteFormat::SectionedText => Vec::new(),
    }
}

/// First date found anywhere in `text`, normalised with the jurisdiction's pivot.
fn page_date(text: &str, profile: &JurisdictionProfile) -> Option<String> {
    find_date_token(text).map(|raw| profile.dates.normalize(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, response: VoteResponse) -> RollCallEntry {
        RollCallEntry {
            name: name.to_string(),
            response,
        }
    }

    fn sample() -> RollCall {
        RollCall {
            printed: Some(Tally {
                yeas: 2,
                nays: 0,
                other: 0,
            }),
            roll_call: vec![
                entry("Smith", VoteResponse::Yea),
                entry("Jones", VoteResponse::Nay),
                entry("Brown", VoteResponse::Excused),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_tally_policies() {
        let rc = sample();
        assert!(!rc.is_consistent());
        assert_eq!(
            rc.tally(TallyPolicy::TrustPage),
            Tally {
                yeas: 2,
                nays: 0,
                other: 0
            }
        );
        assert_eq!(
            rc.tally(TallyPolicy::DeriveFromRoster),
            Tally {
                yeas: 1,
                nays: 1,
                other: 1
            }
        );

        let printed_only = RollCall {
            roll_call: Vec::new(),
            ..sample()
        };
        assert!(printed_only.is_consistent());
        assert_eq!(printed_only.tally(TallyPolicy::DeriveFromRoster).yeas, 2);
    }

    #[test]
    fn test_into_record_fills_from_link_and_profile() {
        let profile = Jurisdiction::Nv.profile();
        let key = BillKey::new(Jurisdiction::Nv, "73rd2005", "AB123");
        let link = VoteLink {
            url: "https://example.org/BillVote.cfm?VoteID=1".to_string(),
            chamber: None,
            description: "Final Passage".to_string(),
            date: None,
        };
        let record = RollCall {
            date: Some("2005-04-19".to_string()),
            ..sample()
        }
        .into_record(key, Some(&link), &profile);

        assert_eq!(record.chamber, profile.default_vote_chamber);
        assert_eq!(record.description, "Final Passage");
        assert_eq!(record.date, "2005-04-19");
        assert_eq!((record.yeas, record.nays, record.other), (2, 0, 0));
        assert_eq!(record.roll_call.len(), 3);
    }

    #[test]
    fn test_nv_vote_links() {
        let html = std::fs::read_to_string("fixtures/nv73_history.html").unwrap();
        let links = find_vote_links(
            &html,
            "https://www.leg.state.nv.us/Session/73rd2005/Reports/history.cfm?ID=123",
            VoteFormat::NvTables,
        );
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].chamber, Some(Chamber::Assembly));
        assert_eq!(links[0].description, "Final Passage");
        assert_eq!(
            links[1].url,
            "https://www.leg.state.nv.us/Session/73rd2005/Reports/BillVote.cfm?VoteID=502"
        );
    }

    #[test]
    fn test_il_vote_links() {
        let html = r#"<table>
            <tr><td><a href="votehistory/091-0012.pdf">3/24/1999 House Third Reading</a></td></tr>
            <tr><td><a href="/legislation/">Back</a></td></tr>
        </table>"#;
        let links = find_vote_links(
            html,
            "https://www.ilga.gov/legislation/votehistory/bill.html",
            VoteFormat::IlRollCallText,
        );
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].date.as_deref(), Some("1999-03-24"));
        assert_eq!(links[0].chamber, Some(Chamber::House));
        assert_eq!(links[0].description, "House Third Reading");
    }

    #[test]
    fn test_vote_links_follow_parent_paths() {
        let html = r#"<a href="../Votes/BillVote.cfm?VoteID=5">Senate Final Passage</a>
            <a href="http://[bad/BillVote.cfm?VoteID=6">Assembly Final Passage</a>"#;
        let links = find_vote_links(
            html,
            "https://www.leg.state.nv.us/Session/73rd2005/Reports/history.cfm?ID=123",
            VoteFormat::NvTables,
        );
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].chamber, Some(Chamber::Senate));
        assert_eq!(
            links[0].url,
            "https://www.leg.state.nv.us/Session/73rd2005/Votes/BillVote.cfm?VoteID=5"
        );
    }

    #[test]
    fn test_format_slugs() {
        for format in VoteFormat::ALL {
            assert_eq!(format.slug().parse::<VoteFormat>().unwrap(), format);
        }
        assert_eq!(VoteFormat::for_jurisdiction(Jurisdiction::Il), Some(VoteFormat::IlRollCallText));
    }
}
