use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{
    metadata::BillPage,
    types::{Extraction, SponsorEntry, SponsorType},
    utils::{elem_text, next_sibling_text, normalize_whitespace, stripped_text},
};

static LABEL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("b, strong").expect("invalid selector: b, strong"));
static PRE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("pre").expect("invalid selector: pre"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("invalid selector: a[href]"));
static BILL_SPONSOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#billsponsordiv").expect("invalid selector: bill sponsor"));
static FLOOR_SPONSOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#floorsponsordiv").expect("invalid selector: floor sponsor"));
static HEADER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("invalid selector: h3"));
static RE_ORDINAL_DISTRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+\d+(?:st|nd|rd|th)$").expect("invalid regex: ordinal district")
});
static RE_BY_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:introduced\s+)?by:?$").expect("invalid regex: by label"));
static RE_BY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:introduced\s+)?by:?\s*").expect("invalid regex: by prefix")
});
static RE_PAREN_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("invalid regex: parenthesised note"));

/// How a jurisdiction marks its primary sponsor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SponsorRule {
    /// The first name listed is the sponsor, the rest co-sponsor.
    FirstListed,
    /// The author with sequence number 1 is the sponsor.
    Sequence,
    /// Authors flagged "Prime" are sponsors.
    PrimeFlag,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawSponsor {
    pub name: String,
    pub sequence: Option<u32>,
    pub prime: bool,
}

impl RawSponsor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Drops trailing district ordinals such as `Smith 12th`.
pub fn clean_sponsor_name(name: &str) -> String {
    let name = normalize_whitespace(name);
    RE_ORDINAL_DISTRICT.replace(&name, "").trim().to_string()
}

pub fn classify_sponsors(raw: Vec<RawSponsor>, rule: SponsorRule) -> Vec<SponsorEntry> {
    raw.into_iter()
        .map(|s| (clean_sponsor_name(&s.name), s))
        .filter(|(name, _)| !name.is_empty())
        .enumerate()
        .map(|(i, (name, s))| {
            let primary = match rule {
                SponsorRule::FirstListed => i == 0,
                SponsorRule::Sequence => s.sequence == Some(1),
                SponsorRule::PrimeFlag => s.prime,
            };
            SponsorEntry {
                sponsor_name: name,
                sponsor_type: if primary {
                    SponsorType::Sponsor
                } else {
                    SponsorType::Cosponsor
                },
            }
        })
        .collect()
}

/// Splits `Smith, Jones and Brown` into names.
pub fn split_sponsor_list(text: &str) -> Vec<String> {
    let text = RE_PAREN_NOTE.replace_all(text, " ");
    text.split(',')
        .flat_map(|part| part.split(" and "))
        .map(|part| normalize_whitespace(part.trim().trim_start_matches("and ")))
        .filter(|part| !part.is_empty())
        .collect()
}

/// Upper-case roster names (`DE LEO`) in title case (`De Leo`).
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn extract_sponsors(html: &str, page: BillPage, rule: SponsorRule) -> Extraction<Vec<SponsorEntry>> {
    let document = Html::parse_document(html);
    let raw = match page {
        BillPage::NvBill => nv_sponsors(&document),
        BillPage::IlStatus => il_sponsors(&document),
        BillPage::UtBill => ut_sponsors(&document),
    };
    match raw {
        Some(raw) => Extraction::Found(classify_sponsors(raw, rule)),
        None => {
            log::debug!("No sponsor block found ({:?})", page);
            Extraction::NotFound
        }
    }
}

fn nv_sponsors(document: &Html) -> Option<Vec<RawSponsor>> {
    let label = document
        .select(&LABEL_SELECTOR)
        .find(|el| RE_BY_LABEL.is_match(&normalize_whitespace(&elem_text(*el))))?;

    let from_sibling = next_sibling_text(label)
        .map(|text| RE_PAREN_NOTE.replace_all(&text, " ").trim().to_string())
        .filter(|text| !text.is_empty());
    let text = match from_sibling {
        Some(text) => text,
        None => {
            let cell = label.parent().and_then(ElementRef::wrap)?;
            RE_BY_PREFIX.replace(&stripped_text(cell), "").to_string()
        }
    };

    Some(split_sponsor_list(&text).into_iter().map(RawSponsor::named).collect())
}

fn il_sponsors(document: &Html) -> Option<Vec<RawSponsor>> {

    let pre = document.select(&PRE_SELECTOR).next()?;
    let sponsors: Vec<RawSponsor> = pre
        .select(&LINK_SELECTOR)
        .filter(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| href.to_lowercase().contains("sponsor"))
        })
        .map(|a| RawSponsor::named(title_case(&elem_text(a))))
        .collect();

    (!sponsors.is_empty()).then_some(sponsors)
}

fn ut_sponsors(document: &Html) -> Option<Vec<RawSponsor>> {

    let mut sponsors = Vec::new();
    let divs: [(&Selector, &str); 2] = [
        (&BILL_SPONSOR_SELECTOR, "Bill Sponsor:"),
        (&FLOOR_SPONSOR_SELECTOR, "Floor Sponsor:"),
    ];
    for (selector, label) in divs {
        if let Some(div) = document.select(selector).next() {
            let name = stripped_text(div).replace(label, "");
            let name = normalize_whitespace(&name);
            if !name.is_empty() {
                sponsors.push(RawSponsor::named(name));
            }
        }
    }
    if !sponsors.is_empty() {
        return Some(sponsors);
    }

    let header = document.select(&HEADER_SELECTOR).next()?;
    let header = stripped_text(header);
    let (_, sponsor) = header.split_once("--")?;
    let sponsor = normalize_whitespace(sponsor);
    (!sponsor.is_empty()).then(|| vec![RawSponsor::named(sponsor)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_district_suffix_is_stripped() {
        assert_eq!(clean_sponsor_name("SMITH, JOHN 12th"), "SMITH, JOHN");
        assert_eq!(clean_sponsor_name("Jones  1st"), "Jones");
        assert_eq!(clean_sponsor_name("Brown 3rd Ave"), "Brown 3rd Ave");
    }

    #[test]
    fn test_rules() {
        let raw = vec![
            RawSponsor {
                name: "Smith 21st".to_string(),
                sequence: Some(2),
                prime: false,
            },
            RawSponsor {
                name: "Jones 4th".to_string(),
                sequence: Some(1),
                prime: true,
            },
        ];

        let by_sequence = classify_sponsors(raw.clone(), SponsorRule::Sequence);
        assert_eq!(by_sequence[0].sponsor_name, "Smith");
        assert_eq!(by_sequence[0].sponsor_type, SponsorType::Cosponsor);
        assert_eq!(by_sequence[1].sponsor_type, SponsorType::Sponsor);

        let by_position = classify_sponsors(raw.clone(), SponsorRule::FirstListed);
        assert_eq!(by_position[0].sponsor_type, SponsorType::Sponsor);

        let by_flag = classify_sponsors(raw, SponsorRule::PrimeFlag);
        assert_eq!(by_flag[1].sponsor_type, SponsorType::Sponsor);
        assert_eq!(by_flag[0].sponsor_type, SponsorType::Cosponsor);
    }

    #[test]
    fn test_nv_by_cell() {
        let html = r#"<table><tr><td><strong>By:</strong> (Bolded name indicates primary sponsor)
            Leslie, Parks, Anderson</td></tr></table>"#;
        let sponsors = extract_sponsors(html, BillPage::NvBill, SponsorRule::FirstListed).unwrap_or_default();
        let names: Vec<&str> = sponsors.iter().map(|s| s.sponsor_name.as_str()).collect();
        assert_eq!(names, ["Leslie", "Parks", "Anderson"]);
        assert_eq!(sponsors[0].sponsor_type, SponsorType::Sponsor);
        assert_eq!(sponsors[2].sponsor_type, SponsorType::Cosponsor);
    }

    #[test]
    fn test_il_sponsor_links() {
        let html = r#"<pre>
   Sponsor  <a href="/senate/sponsor.asp?id=1">DEL VALLE</a>
 House Sponsor <a href="sponsor.jsp?x=2">MADIGAN,MJ</a> <a href="/other">IGNORED</a>
</pre>"#;
        let sponsors = extract_sponsors(html, BillPage::IlStatus, SponsorRule::FirstListed).unwrap_or_default();
        assert_eq!(sponsors.len(), 2);
        assert_eq!(sponsors[0].sponsor_name, "Del Valle");
        assert_eq!(sponsors[1].sponsor_name, "Madigan,mj");
    }

    #[test]
    fn test_ut_header_and_divs() {
        let old = "<h3>H.B. 12 SCHOOL FEES AMENDMENTS -- Brad King</h3>";
        let sponsors = extract_sponsors(old, BillPage::UtBill, SponsorRule::FirstListed).unwrap_or_default();
        assert_eq!(sponsors[0].sponsor_name, "Brad King");

        let new = r#"<div id="billsponsordiv">Bill Sponsor: Rep. Adams</div><div id="floorsponsordiv">Floor Sponsor: Sen. Hillyard</div>"#;
        let sponsors = extract_sponsors(new, BillPage::UtBill, SponsorRule::FirstListed).unwrap_or_default();
        assert_eq!(sponsors.len(), 2);
        assert_eq!(sponsors[1].sponsor_name, "Sen. Hillyard");
        assert_eq!(sponsors[1].sponsor_type, SponsorType::Cosponsor);
    }

    #[test]
    fn test_missing_block_is_not_found() {
        let html = "<p>No sponsors listed</p>";
        assert_eq!(
            extract_sponsors(html, BillPage::NvBill, SponsorRule::FirstListed),
            Extraction::NotFound
        );
    }
}
