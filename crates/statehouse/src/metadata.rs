use std::{
    collections::HashMap,
    fmt::Display,
    str::FromStr,
    sync::LazyLock,
};

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{
    types::{Extraction, Jurisdiction},
    utils::{elem_text, next_sibling_text, normalize_whitespace, stripped_text},
};

static EM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("em").expect("invalid selector: em"));
static BOLD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("b, strong").expect("invalid selector: b, strong"));
static HEADER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("invalid selector: h3"));
static LAST_ACTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.billinfoulm li").expect("invalid selector: last action"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));
static HISTORY_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href*='history.cfm?ID=']").expect("invalid selector: history link")
});
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector: td"));
static RE_BDR_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(BDR[^)]*\)\s*$").expect("invalid regex: bdr note"));

#[derive(Debug, thiserror::Error)]
#[error("Invalid bill page '{0}'. Accepted values: nv-bill, il-status, ut-bill")]
pub struct BillPageParseError(String);

/// Bill pages that carry metadata or sponsors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillPage {
    /// Nevada history page with an `Introduced By:` / `By:` label.
    NvBill,
    /// Illinois status page: `<em>` labels and sponsor links in the `<pre>` block.
    IlStatus,
    /// Utah bill page: `TITLE -- SPONSOR` header or sponsor divs.
    UtBill,
}

impl BillPage {
    pub fn for_jurisdiction(jurisdiction: Jurisdiction) -> Option<BillPage> {
        match jurisdiction {
            Jurisdiction::Nv => Some(BillPage::NvBill),
            Jurisdiction::Il => Some(BillPage::IlStatus),
            Jurisdiction::Ut => Some(BillPage::UtBill),
            _ => None,
        }
    }
}

impl FromStr for BillPage {
    type Err = BillPageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nv-bill" => Ok(BillPage::NvBill),
            "il-status" => Ok(BillPage::IlStatus),
            "ut-bill" => Ok(BillPage::UtBill),
            _ => Err(BillPageParseError(s.to_string())),
        }
    }
}

impl Display for BillPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillPage::NvBill => write!(f, "nv-bill"),
            BillPage::IlStatus => write!(f, "il-status"),
            BillPage::UtBill => write!(f, "ut-bill"),
        }
    }
}

/// Title/description/status scraped from a bill page. Fields the page does not state stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl PageMetadata {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

pub fn extract_metadata(html: &str, page: BillPage) -> Extraction<PageMetadata> {
    let document = Html::parse_document(html);
    let metadata = match page {
        BillPage::IlStatus => il_metadata(&document),
        BillPage::UtBill => ut_metadata(&document),
        BillPage::NvBill => nv_metadata(&document),
    };
    if metadata.is_empty() {
        Extraction::NotFound
    } else {
        Extraction::Found(metadata)
    }
}

fn labelled<'a>(labels: &[ElementRef<'a>], needle: &str) -> Option<String> {
    labels
        .iter()
        .find(|el| elem_text(**el).contains(needle))
        .and_then(|el| next_sibling_text(*el))
}

/// `<strong>Summary:</strong> text (BDR 38-412)`; the drafting-request number is dropped.
fn nv_metadata(document: &Html) -> PageMetadata {
    let labels: Vec<ElementRef> = document.select(&BOLD_SELECTOR).collect();
    let description = labelled(&labels, "Summary")
        .map(|text| RE_BDR_NOTE.replace(&text, "").to_string())
        .filter(|text| !text.is_empty());

    PageMetadata {
        description,
        ..Default::default()
    }
}

fn il_metadata(document: &Html) -> PageMetadata {
    let labels: Vec<ElementRef> = document.select(&EM_SELECTOR).collect();

    PageMetadata {
        title: labelled(&labels, "Short"),
        description: labelled(&labels, "Synopsis"),
        status: labelled(&labels, "Last action on Bill"),
    }
}

fn ut_metadata(document: &Html) -> PageMetadata {
    // "H.B. 12 SCHOOL FEES AMENDMENTS -- Brad King"
    let title = document.select(&HEADER_SELECTOR).next().and_then(|h3| {
        let text = stripped_text(h3);
        let title_part = text.split_once("--").map_or(text.as_str(), |(t, _)| t);
        let words: Vec<&str> = title_part.split_whitespace().skip(2).collect();
        (!words.is_empty()).then(|| words.join(" "))
    });

    let status = document
        .select(&LAST_ACTION_SELECTOR)
        .map(stripped_text)
        .find(|text| text.contains("Last Action"))
        .map(|text| normalize_whitespace(&text.replace("Last Action:", "")))
        .filter(|text| !text.is_empty());

    PageMetadata {
        title,
        description: None,
        status,
    }
}

/// Parses a Nevada session status listing (`ABStatus.cfm`, `SBStatus.cfm`) into
/// `bill id -> status`. Bill ids are upper-cased as printed, e.g. `AB12`.
pub fn nv_status_listing(html: &str) -> HashMap<String, String> {
    let document = Html::parse_document(html);
    let cell_text = |cell: ElementRef| {
        cell.text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut statuses = HashMap::new();
    for row in document.select(&ROW_SELECTOR) {
        let Some(link) = row.select(&HISTORY_LINK_SELECTOR).next() else {
            continue;
        };
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        let status = match cells.len() {
            0 | 1 => continue,
            2 => cell_text(cells[1]),
            _ => normalize_whitespace(&format!("{} {}", cell_text(cells[1]), cell_text(cells[2]))),
        };
        let bill = normalize_whitespace(&elem_text(link)).to_uppercase();
        if !bill.is_empty() && !status.is_empty() {
            statuses.insert(bill, status);
        }
    }
    statuses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_il_status_labels() {
        let html = r#"<html><body>
            <em>Short Description: </em> SCHOOL CODE-TECH<br>
            <em>Synopsis As Introduced</em>
               Amends the School Code.
               Effective immediately.<br>
            <em>Last action on Bill: </em> PUBLIC ACT.............. 91-0012<br>
            </body></html>"#;
        let metadata = extract_metadata(html, BillPage::IlStatus).found().unwrap();
        assert_eq!(metadata.title.as_deref(), Some("SCHOOL CODE-TECH"));
        assert_eq!(
            metadata.description.as_deref(),
            Some("Amends the School Code. Effective immediately.")
        );
        assert_eq!(metadata.status.as_deref(), Some("PUBLIC ACT.............. 91-0012"));
    }

    #[test]
    fn test_ut_title_and_status() {
        let html = r#"<h3>H.B. 12 School Fees Amendments -- Brad King</h3>
            <ul class="billinfoulm"><li>Last Action: Governor Signed 3/19/2002</li></ul>"#;
        let metadata = extract_metadata(html, BillPage::UtBill).found().unwrap();
        assert_eq!(metadata.title.as_deref(), Some("School Fees Amendments"));
        assert_eq!(metadata.status.as_deref(), Some("Governor Signed 3/19/2002"));
    }

    #[test]
    fn test_page_without_labels_is_not_found() {
        assert_eq!(
            extract_metadata("<p>nothing</p>", BillPage::IlStatus),
            Extraction::NotFound
        );
    }

    #[test]
    fn test_nv_summary() {
        let html = std::fs::read_to_string("fixtures/nv73_history.html").unwrap();
        let metadata = extract_metadata(&html, BillPage::NvBill).found().unwrap();
        assert_eq!(
            metadata.description.as_deref(),
            Some("Revises provisions governing the licensing of child care facilities.")
        );
        assert_eq!(metadata.title, None);
        assert_eq!(metadata.status, None);
    }

    #[test]
    fn test_nv_status_listing() {
        let html = r#"<table>
            <tr><td><a href="history.cfm?ID=12">AB12</a></td><td>Chapter <font>123</font></td></tr>
            <tr valign="top"><td><a href="history.cfm?ID=13">sb4</a></td><td>Senate</td><td>In Committee</td></tr>
            <tr><td>Header</td><td>Status</td></tr>
        </table>"#;
        let statuses = nv_status_listing(html);
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses["AB12"], "Chapter 123");
        assert_eq!(statuses["SB4"], "Senate In Committee");
    }
}
