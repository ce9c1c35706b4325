use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::RawEntry;
use crate::{
    types::Extraction,
    utils::{direct_text, elem_text, normalize_whitespace},
};

static SCOPED_TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.propHistory table.history").expect("invalid selector: scoped history table")
});
static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.history").expect("invalid selector: history table"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));
static DATE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.date").expect("invalid selector: td.date"));
static ABBR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("abbr").expect("invalid selector: abbr"));
static ENTRY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.entry").expect("invalid selector: td.entry"));

fn house_name(abbr: &str) -> &'static str {
    match abbr.trim().chars().next() {
        Some('S' | 's') => "Senate",
        Some('A' | 'a') => "Assembly",
        _ => "",
    }
}

pub(super) fn history_table(html: &str) -> Extraction<Vec<RawEntry>> {
    let document = Html::parse_document(html);

    let Some(table) = document
        .select(&SCOPED_TABLE_SELECTOR)
        .next()
        .or_else(|| document.select(&TABLE_SELECTOR).next())
    else {
        return Extraction::NotFound;
    };

    let entries = table
        .select(&ROW_SELECTOR)
        .filter_map(|row| {
            let date_cell = row.select(&DATE_SELECTOR).next()?;
            let entry = row.select(&ENTRY_SELECTOR).next()?;
            let house = date_cell
                .select(&ABBR_SELECTOR)
                .next()
                .map(|abbr| {
                    abbr.value()
                        .attr("title")
                        .map(str::to_string)
                        .unwrap_or_else(|| house_name(&elem_text(abbr)).to_string())
                })
                .unwrap_or_default();
            Some(RawEntry::new(
                direct_text(date_cell),
                normalize_whitespace(&elem_text(entry)),
                house,
            ))
        })
        .collect();

    Extraction::Found(entries)
}

#[cfg(test)]
mod tests {
    use crate::{
        history::{SiteVersion, extract_history},
        types::{Extraction, Jurisdiction},
    };

    #[test]
    fn test_history_table() {
        let html = r##"<div class="propHistory"><table class="history">
            <tr><th>Date / House</th><th>Action</th></tr>
            <tr><td class="date">1/5/1995 <abbr title="Assembly">Asm.</abbr></td>
                <td class="entry">Introduced by <a href="#">Representative Foti</a></td></tr>
            <tr><td class="date">2/14/1995 <abbr>Sen.</abbr></td>
                <td class="entry">Received from Assembly</td></tr>
            <tr><td class="date">1/9/1995 <abbr title="Assembly">Asm.</abbr></td>
                <td class="entry">Read first time and referred to committee on Rules</td></tr>
        </table></div>"##;

        let profile = Jurisdiction::Wi.profile();
        let history = extract_history(html, SiteVersion::WiHistoryTable, &profile).unwrap_or_default();
        let rows: Vec<(&str, &str)> = history
            .iter()
            .map(|e| (e.date.as_str(), e.action.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("1995-01-05", "A - Introduced by Representative Foti"),
                ("1995-01-09", "A - Read first time and referred to committee on Rules"),
                ("1995-02-14", "S - Received from Assembly"),
            ]
        );
    }

    #[test]
    fn test_missing_table() {
        let profile = Jurisdiction::Wi.profile();
        assert_eq!(
            extract_history("<p>no history</p>", SiteVersion::WiHistoryTable, &profile),
            Extraction::NotFound
        );
    }
}
