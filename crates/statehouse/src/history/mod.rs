//! Bill-history extraction.
//!
//! Every site layout is handled in three stages: locate the structural anchor,
//! pull out raw `(date text, action text, chamber hint)` units, then run the
//! shared [`finalize`] pass that normalises dates, applies the chamber prefix,
//! drops empty and "no action" rows and sorts by date.

mod nevada;
mod status_text;
mod wisconsin;

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    dates::is_iso,
    jurisdiction::JurisdictionProfile,
    types::{Chamber, ChamberTag, Extraction, HistoryEntry, Jurisdiction},
    utils::normalize_whitespace,
};

#[derive(Debug, thiserror::Error)]
#[error("Invalid site version '{0}'. Accepted values: nv69, nv70, nv72, nv73, ut-status-text, il-status-text, wi-history-table")]
pub struct SiteVersionParseError(String);

/// Page layouts the history extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteVersion {
    /// Nevada 1997: `<b>Introduced:</b>`, committee table, dated bullet list.
    Nv69,
    /// Nevada 1999 and 2001: `Introduced on`, hearings table, undated bullets.
    Nv70,
    /// Nevada 2003: `Past Hearings` table and `JournalPopup` history links.
    Nv72,
    /// Nevada 2005 and 2007: as 2003 with four-column hearings and time suffixes.
    Nv73,
    /// Utah fixed-width status text.
    UtStatusText,
    /// Illinois free-text status page.
    IlStatusText,
    /// Wisconsin `table.history`.
    WiHistoryTable,
}

impl SiteVersion {
    pub const ALL: [SiteVersion; 7] = [
        SiteVersion::Nv69,
        SiteVersion::Nv70,
        SiteVersion::Nv72,
        SiteVersion::Nv73,
        SiteVersion::UtStatusText,
        SiteVersion::IlStatusText,
        SiteVersion::WiHistoryTable,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            SiteVersion::Nv69 => "nv69",
            SiteVersion::Nv70 => "nv70",
            SiteVersion::Nv72 => "nv72",
            SiteVersion::Nv73 => "nv73",
            SiteVersion::UtStatusText => "ut-status-text",
            SiteVersion::IlStatusText => "il-status-text",
            SiteVersion::WiHistoryTable => "wi-history-table",
        }
    }

    /// Picks the layout a jurisdiction used for `session` (e.g. `70th1999`, `2001`).
    pub fn for_session(jurisdiction: Jurisdiction, session: &str) -> Option<SiteVersion> {
        match jurisdiction {
            Jurisdiction::Nv => {
                let ordinal: u32 = session
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
                    .parse()
                    .ok()?;
                match ordinal {
                    69 => Some(SiteVersion::Nv69),
                    70 | 71 => Some(SiteVersion::Nv70),
                    72 => Some(SiteVersion::Nv72),
                    73 | 74 => Some(SiteVersion::Nv73),
                    _ => None,
                }
            }
            Jurisdiction::Ut => Some(SiteVersion::UtStatusText),
            Jurisdiction::Il => Some(SiteVersion::IlStatusText),
            Jurisdiction::Wi => Some(SiteVersion::WiHistoryTable),
            _ => None,
        }
    }
}

impl FromStr for SiteVersion {
    type Err = SiteVersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SiteVersion::ALL
            .into_iter()
            .find(|v| v.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SiteVersionParseError(s.to_string()))
    }
}

impl Display for SiteVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// One history row before normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawEntry {
    /// Date as printed, or an ISO date when the layout only gives month and day.
    pub raw_date: String,
    pub action: String,
    /// Text inspected for a chamber name (often the action itself).
    pub chamber_hint: String,
}

impl RawEntry {
    pub fn new(raw_date: impl Into<String>, action: impl Into<String>, chamber_hint: impl Into<String>) -> Self {
        Self {
            raw_date: raw_date.into(),
            action: action.into(),
            chamber_hint: chamber_hint.into(),
        }
    }

    /// Entry whose chamber is looked for in the action text.
    pub fn self_hinted(raw_date: impl Into<String>, action: impl Into<String>) -> Self {
        let action = action.into();
        Self {
            raw_date: raw_date.into(),
            chamber_hint: action.clone(),
            action,
        }
    }
}

/// Extracts and normalises a bill's history from a fetched page.
pub fn extract_history(
    body: &str,
    site: SiteVersion,
    profile: &JurisdictionProfile,
) -> Extraction<Vec<HistoryEntry>> {
    let raw = match site {
        SiteVersion::Nv69 => nevada::nv69(body, profile),
        SiteVersion::Nv70 => nevada::nv70(body),
        SiteVersion::Nv72 => nevada::nv72(body),
        SiteVersion::Nv73 => nevada::nv73(body),
        SiteVersion::UtStatusText => status_text::utah(body),
        SiteVersion::IlStatusText => status_text::illinois(body),
        SiteVersion::WiHistoryTable => wisconsin::history_table(body),
    };

    match raw {
        Extraction::Found(entries) => {
            let found = entries.len();
            let history = finalize(entries, profile);
            log::debug!("[{}] kept {} of {} history rows", site, history.len(), found);
            Extraction::Found(history)
        }
        Extraction::NotFound => {
            log::warn!("[{}] history anchor not found", site);
            Extraction::NotFound
        }
    }
}

/// Prefix for an action given the text that may name its chamber.
pub fn chamber_tag(hint: &str, profile: &JurisdictionProfile) -> ChamberTag {
    Chamber::detect(hint)
        .map(ChamberTag::from)
        .unwrap_or(profile.default_history_tag)
}

pub fn with_prefix(action: &str, tag: ChamberTag) -> String {
    let prefix = tag.prefix();
    if action.starts_with(prefix) {
        action.to_string()
    } else {
        format!("{prefix}{action}")
    }
}

fn is_no_action(action: &str) -> bool {
    let low = action.to_lowercase();
    low.starts_with("no action") || low.contains("no further action")
}

fn is_prefix_only(action: &str) -> bool {
    let mut chars = action.chars();
    matches!(
        (chars.next(), chars.as_str().trim()),
        (Some(c), "-") if c.is_ascii_uppercase()
    )
}

/// The shared third stage: normalise, drop empty and no-op rows, prefix, sort.
///
/// Rows with an ISO date sort chronologically. Rows whose date could not be
/// parsed keep their raw text and go last, in page order.
pub fn finalize(raw: Vec<RawEntry>, profile: &JurisdictionProfile) -> Vec<HistoryEntry> {
    let mut history: Vec<HistoryEntry> = raw
        .into_iter()
        .filter_map(|entry| {
            let action = normalize_whitespace(&entry.action);
            let date = profile.dates.normalize(&entry.raw_date);
            if date.is_empty() || action.is_empty() || is_no_action(&action) || is_prefix_only(&action) {
                return None;
            }
            let action = with_prefix(&action, chamber_tag(&entry.chamber_hint, profile));
            Some(HistoryEntry { date, action })
        })
        .collect();

    history.sort_by(|a, b| match (is_iso(&a.date), is_iso(&b.date)) {
        (true, true) => a.date.cmp(&b.date),
        (a_iso, b_iso) => b_iso.cmp(&a_iso),
    });
    history
}
