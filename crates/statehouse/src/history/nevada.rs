use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::RawEntry;
use crate::{
    dates::{find_date_token, iso},
    jurisdiction::JurisdictionProfile,
    sponsors::{split_sponsor_list, title_case},
    types::Extraction,
    utils::{
        ancestor, child_elements, direct_text, elem_text, elements_after, find_labelled,
        next_sibling_element, next_sibling_text, stripped_text,
    },
};

static RE_DATED_BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}/\d{2}/\d{2})\s+(.*)$").expect("invalid regex: dated bullet")
});
static RE_COMMITTEE_DATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+((?:\d{1,2}-\d{1,2})(?:;\s*\d{1,2}-\d{1,2})*)")
        .expect("invalid regex: committee dates")
});
static RE_HEARD_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Heard in the\s+(?:the\s+)?following Committees").expect("invalid regex: heard in")
});
static RE_INTRODUCED_ON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Introduced\s+on").expect("invalid regex: introduced on"));
static RE_BY_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^By:\s*\([^)]*\)\s*").expect("invalid regex: by note"));
static RE_TIME_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\d{1,2}:\d{2}\s*[AP]M$").expect("invalid regex: time suffix")
});

static CONTENT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#content").expect("invalid selector: content"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector: td"));
static LIST_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul").expect("invalid selector: ul"));
static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("invalid selector: table"));
static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("invalid selector: li"));
static JOURNAL_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href*='JournalPopup']").expect("invalid selector: journal link")
});

fn introduced_by(sponsors: &str) -> String {
    format!("Introduced By: {sponsors}")
}

fn is_exactly(label: &'static str) -> impl Fn(&str) -> bool {
    move |text| text == label
}

/// 1997 layout.
pub(super) fn nv69(html: &str, profile: &JurisdictionProfile) -> Extraction<Vec<RawEntry>> {
    let document = Html::parse_document(html);
    let content = document
        .select(&CONTENT_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element());

    let intro_label = find_labelled(content, &["b"], is_exactly("Introduced:"));
    let committee_label = find_labelled(content, &["b"], |t| RE_HEARD_IN.is_match(t));
    let timeline = content.select(&LIST_SELECTOR).next();
    if intro_label.is_none() && committee_label.is_none() && timeline.is_none() {
        return Extraction::NotFound;
    }

    let mut entries = Vec::new();
    let intro_raw = intro_label.and_then(next_sibling_text);

    if let Some(intro_raw) = &intro_raw
        && let Some(by) = find_labelled(content, &["b"], is_exactly("Introduced By:"))
        && let Some(sponsor) = next_sibling_text(by)
    {
        entries.push(RawEntry::new(intro_raw.clone(), introduced_by(&sponsor), ""));
    }

    // Committee cells read "JUDICIARY 3-7; 3-12" and carry no year.
    let intro_year = intro_raw.as_deref().and_then(|raw| profile.dates.parse(raw)).map(|d| d.year());
    if let Some(label) = committee_label
        && let Some(year) = intro_year
        && let Some(table) = ancestor(label, "table")
    {
        for row in table.select(&ROW_SELECTOR).skip(1) {
            let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
            if cells.len() < 3 {
                continue;
            }
            let chamber = stripped_text(cells[1]).trim_end_matches(':').to_string();
            let info = stripped_text(cells[2]);
            let Some(caps) = RE_COMMITTEE_DATES.captures(&info) else {
                continue;
            };
            let committee = title_case(&caps[1]);
            for piece in caps[2].split(';') {
                let Some(date) = profile.dates.month_day_in_year(piece, year) else {
                    continue;
                };
                entries.push(RawEntry::new(
                    iso(date),
                    format!("Heard in {chamber} Committee {committee}"),
                    chamber.clone(),
                ));
            }
        }
    }

    if let Some(list) = timeline {
        for item in list.select(&ITEM_SELECTOR) {
            let text = direct_text(item);
            if let Some(caps) = RE_DATED_BULLET.captures(&text) {
                entries.push(RawEntry::self_hinted(&caps[1], &caps[2]));
            }
        }
    }

    Extraction::Found(entries)
}

/// 1999 and 2001 layout.
pub(super) fn nv70(html: &str) -> Extraction<Vec<RawEntry>> {
    let document = Html::parse_document(html);
    let content = document.root_element();

    let intro_label = find_labelled(content, &["b"], is_exactly("Introduced on"));
    let hearings_label = find_labelled(content, &["b"], is_exactly("Hearings"));
    let items: Vec<ElementRef> = content
        .select(&ITEM_SELECTOR)
        .filter(|li| ancestor(*li, "table").is_none())
        .collect();
    if intro_label.is_none() && hearings_label.is_none() && items.is_empty() {
        return Extraction::NotFound;
    }

    let mut entries = Vec::new();

    if let Some(intro_raw) = intro_label.and_then(next_sibling_text)
        && let Some(by) = find_labelled(content, &["b"], is_exactly("By"))
        && let Some(sponsor) = next_sibling_text(by)
    {
        let sponsor = sponsor.trim_end_matches(',').trim();
        entries.push(RawEntry::new(intro_raw, introduced_by(sponsor), ""));
    }

    let hearings = hearings_label
        .and_then(|label| label.parent().and_then(ElementRef::wrap))
        .and_then(|cell| next_sibling_element(cell, "td"))
        .and_then(|cell| cell.select(&TABLE_SELECTOR).next());
    if let Some(table) = hearings {
        for row in table.select(&ROW_SELECTOR) {
            let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
            if cells.len() < 3 {
                continue;
            }
            let committee = stripped_text(cells[0]);
            entries.push(RawEntry::new(stripped_text(cells[1]), stripped_text(cells[2]), committee));
        }
    }

    // Bullets outside tables take the nearest date printed before them.
    for item in items {
        let date = item.prev_siblings().find_map(|sibling| {
            let text = match ElementRef::wrap(sibling) {
                Some(el) => elem_text(el),
                None => sibling.value().as_text().map(|t| t.trim().to_string())?,
            };
            find_date_token(&text).map(str::to_string)
        });
        if let Some(date) = date {
            entries.push(RawEntry::self_hinted(date, stripped_text(item)));
        }
    }

    Extraction::Found(entries)
}

/// 2003 layout: three-column hearings, sponsor list in the `By:` cell.
pub(super) fn nv72(html: &str) -> Extraction<Vec<RawEntry>> {
    journal_layout(html, HearingColumns { min: 3, action: 2 })
}

/// 2005 and 2007 layout: minutes column before the action, times after dates.
pub(super) fn nv73(html: &str) -> Extraction<Vec<RawEntry>> {
    journal_layout(html, HearingColumns { min: 4, action: 3 })
}

struct HearingColumns {
    min: usize,
    action: usize,
}

fn journal_layout(html: &str, columns: HearingColumns) -> Extraction<Vec<RawEntry>> {
    let document = Html::parse_document(html);
    let content = document.root_element();

    let intro_label = find_labelled(content, &["strong"], |t| RE_INTRODUCED_ON.is_match(t));
    let hearings_label = find_labelled(content, &["strong", "b"], |t| t.contains("Past Hearings"));
    let history_label = find_labelled(content, &["strong", "b"], |t| t.contains("Bill History"));
    if intro_label.is_none() && hearings_label.is_none() && history_label.is_none() {
        return Extraction::NotFound;
    }

    let mut entries = Vec::new();

    if let Some(intro_raw) = intro_label.and_then(next_sibling_text)
        && let Some(sponsors) = sponsor_cell(content)
    {
        entries.push(RawEntry::new(intro_raw, introduced_by(&sponsors), ""));
    }

    if let Some(table) = hearings_label.and_then(|label| ancestor(label, "table")) {
        for row in table.select(&ROW_SELECTOR).skip(1) {
            let cells: Vec<ElementRef> = child_elements(row, "td").collect();
            if cells.len() < columns.min {
                continue;
            }
            let when = stripped_text(cells[1]);
            let when = RE_TIME_SUFFIX.replace(&when, "");
            let Some(date) = when.split_whitespace().next() else {
                continue;
            };
            entries.push(RawEntry::new(
                date,
                stripped_text(cells[columns.action]),
                stripped_text(cells[0]),
            ));
        }
    }

    if let Some(label) = history_label {
        for link in elements_after(content, label, &JOURNAL_LINK_SELECTOR) {
            let action = ancestor(link, "tr")
                .and_then(|row| next_sibling_element(row, "tr"))
                .and_then(|row| row.select(&ITEM_SELECTOR).next());
            if let Some(item) = action {
                entries.push(RawEntry::self_hinted(stripped_text(link), stripped_text(item)));
            }
        }
    }

    Extraction::Found(entries)
}

/// Sponsors from the `By:` cell, or from the cell holding the "Bolded" note on later pages.
fn sponsor_cell(content: ElementRef) -> Option<String> {
    let cell = find_labelled(content, &["strong"], |t| t.starts_with("By:"))
        .and_then(|label| label.parent().and_then(ElementRef::wrap))
        .or_else(|| {
            find_labelled(content, &["strong"], |t| t.to_lowercase().contains("bolded"))
                .and_then(|note| ancestor(note, "td"))
        })?;

    let text = stripped_text(cell);
    let text = RE_BY_NOTE.replace(&text, "");
    let names = split_sponsor_list(&text);
    (!names.is_empty()).then(|| names.join(", "))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{history::extract_history, history::SiteVersion, types::Jurisdiction};

    #[test]
    fn test_nv69_page() {
        let html = r#"<html><body><div id="content">
            <b>Introduced:</b> 02/10/97<br>
            <b>Introduced By:</b> Committee on Judiciary<br>
            <table>
              <tr><td colspan="3"><b>Heard in the the following Committees</b></td></tr>
              <tr><td></td><td>Assembly:</td><td>JUDICIARY 3-7; 3-12</td></tr>
              <tr><td></td><td>Senate:</td><td>no dates here</td></tr>
            </table>
            <ul>
              <li>02/10/97 Read first time. Referred to Committee on Judiciary.</li>
              <li>03/20/97 From committee: Do pass.</li>
              <li>not a dated bullet</li>
            </ul>
        </div></body></html>"#;

        let profile = Jurisdiction::Nv.profile();
        let history = extract_history(html, SiteVersion::Nv69, &profile).unwrap_or_default();
        let rows: Vec<(&str, &str)> = history
            .iter()
            .map(|e| (e.date.as_str(), e.action.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("1997-02-10", "P - Introduced By: Committee on Judiciary"),
                ("1997-02-10", "P - Read first time. Referred to Committee on Judiciary."),
                ("1997-03-07", "A - Heard in Assembly Committee Judiciary"),
                ("1997-03-12", "A - Heard in Assembly Committee Judiciary"),
                ("1997-03-20", "P - From committee: Do pass."),
            ]
        );
    }

    #[test]
    fn test_nv70_undated_bullets_take_previous_date() {
        let html = r#"<html><body>
            <table><tr>
              <td><b>Introduced on</b> Feb 15, 1999</td>
              <td><b>By</b> Assemblyman Perkins,</td>
            </tr></table>
            <table><tr><td><b>Hearings</b></td><td>
              <table>
                <tr><td>Assembly Commerce</td><td>Mar-02-1999</td><td>Amend, and do pass</td></tr>
                <tr><td>Assembly Commerce</td><td>Mar-01-1999</td><td>No Action</td></tr>
              </table>
            </td></tr></table>
            Feb 15, 1999
            <li>Read first time. Referred to Committee on Commerce.</li>
            Apr.01,1999
            <li>In Senate.</li>
        </body></html>"#;

        let profile = Jurisdiction::Nv.profile();
        let history = extract_history(html, SiteVersion::Nv70, &profile).unwrap_or_default();
        let rows: Vec<(&str, &str)> = history
            .iter()
            .map(|e| (e.date.as_str(), e.action.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("1999-02-15", "P - Introduced By: Assemblyman Perkins"),
                ("1999-02-15", "P - Read first time. Referred to Committee on Commerce."),
                ("1999-03-02", "A - Amend, and do pass"),
                ("1999-04-01", "S - In Senate."),
            ]
        );
    }

    #[test]
    fn test_nv73_fixture() {
        let html = fs::read_to_string("fixtures/nv73_history.html").unwrap();
        let profile = Jurisdiction::Nv.profile();
        let history = extract_history(&html, SiteVersion::Nv73, &profile).unwrap_or_default();

        assert_eq!(history.first().unwrap().date, "2005-03-21");
        assert_eq!(
            history.first().unwrap().action,
            "P - Introduced By: Leslie, Parks, Anderson"
        );
        assert!(history.iter().any(|e| e.action == "A - Amend, and do pass as amended."));
        assert!(!history.iter().any(|e| e.action.to_lowercase().contains("no action")));
        assert!(!history.iter().any(|e| e.action.contains("no further action")));
        assert!(history.iter().any(|e| e.date == "2005-06-17" && e.action == "P - Approved by the Governor. Chapter 301."));
        assert!(history.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_repeat_extraction_is_identical() {
        let html = fs::read_to_string("fixtures/nv73_history.html").unwrap();
        let profile = Jurisdiction::Nv.profile();
        let first = extract_history(&html, SiteVersion::Nv73, &profile);
        let second = extract_history(&html, SiteVersion::Nv73, &profile);
        assert!(first.is_found());
        assert_eq!(
            serde_json::to_string(&first.unwrap_or_default()).unwrap(),
            serde_json::to_string(&second.unwrap_or_default()).unwrap()
        );
    }

    #[test]
    fn test_nv72_three_column_hearings() {
        let html = r#"<html><body>
            <table>
              <tr><td><strong>Introduced on</strong> Mar-10-2003</td></tr>
              <tr><td><strong>By:</strong> (Bolded name indicates primary sponsor) Buckley, Giunchigliani</td></tr>
            </table>
            <table>
              <tr><td><strong>Past Hearings</strong></td></tr>
              <tr><td>Assembly Judiciary</td><td>Mar-25-2003 08:00 AM</td><td>Do pass</td></tr>
            </table>
            <table>
              <tr><td><b>Bill History</b></td></tr>
              <tr><td><p><a href="JournalPopup.cfm?x=1">Mar.10,2003</a></p></td></tr>
              <tr><td><ul><li>Read first time.</li></ul></td></tr>
            </table>
        </body></html>"#;

        let profile = Jurisdiction::Nv.profile();
        let history = extract_history(html, SiteVersion::Nv72, &profile).unwrap_or_default();
        let rows: Vec<(&str, &str)> = history
            .iter()
            .map(|e| (e.date.as_str(), e.action.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("2003-03-10", "P - Introduced By: Buckley, Giunchigliani"),
                ("2003-03-10", "P - Read first time."),
                ("2003-03-25", "A - Do pass"),
            ]
        );
    }

    #[test]
    fn test_missing_anchor_is_not_found() {
        let profile = Jurisdiction::Nv.profile();
        let html = "<html><body><p>Page moved</p></body></html>";
        for site in [SiteVersion::Nv70, SiteVersion::Nv72, SiteVersion::Nv73] {
            assert_eq!(extract_history(html, site, &profile), Extraction::NotFound);
        }
    }
}
