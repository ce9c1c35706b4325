use std::sync::LazyLock;

use regex::Regex;

use super::RawEntry;
use crate::{types::Extraction, utils::document_text};

static RE_UT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\d{1,2}/\d{1,2}/\d{2})\s+(.+?)\s*$").expect("invalid regex: utah status line")
});
static RE_IL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*([A-Za-z]{3}-\d{2}-\d{4}|\d{2}-\d{2}-\d{2})\s+(.+?)\s*$")
        .expect("invalid regex: illinois status line")
});
static RE_IL_CHAMBER_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([HS])\s+(.+)$").expect("invalid regex: illinois chamber column"));

/// Utah status dump: `MM/DD/YY  action text  LOCATION`. The last column is a location code.
pub(super) fn utah(body: &str) -> Extraction<Vec<RawEntry>> {
    let text = document_text(body);
    let entries: Vec<RawEntry> = RE_UT_LINE
        .captures_iter(&text)
        .map(|caps| {
            let words: Vec<&str> = caps[2].split_whitespace().collect();
            let action = match words.split_last() {
                Some((_, rest)) if !rest.is_empty() => rest.join(" "),
                _ => words.join(" "),
            };
            RawEntry::self_hinted(&caps[1], action)
        })
        .collect();

    if entries.is_empty() {
        Extraction::NotFound
    } else {
        Extraction::Found(entries)
    }
}

/// Illinois status page: `JAN-05-2001  H  FILED WITH CLERK` or `98-01-22  S  FIRST READING`.
pub(super) fn illinois(body: &str) -> Extraction<Vec<RawEntry>> {
    let text = document_text(body);
    let entries: Vec<RawEntry> = RE_IL_LINE
        .captures_iter(&text)
        .map(|caps| {
            let rest = &caps[2];
            match RE_IL_CHAMBER_COLUMN.captures(rest) {
                Some(column) => {
                    let hint = if &column[1] == "S" { "Senate" } else { "House" };
                    RawEntry::new(&caps[1], &column[2], hint)
                }
                None => RawEntry::self_hinted(&caps[1], rest),
            }
        })
        .collect();

    if entries.is_empty() {
        Extraction::NotFound
    } else {
        Extraction::Found(entries)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        history::{SiteVersion, extract_history},
        types::{Extraction, Jurisdiction},
    };

    #[test]
    fn test_utah_status_text() {
        let body = "\
H.B. 12   SCHOOL FEES AMENDMENTS  (B. King)

01/15/01     Bill Numbered but not Distributed           LFA
01/16/01     Numbered Bill Publicly Distributed          CLERK
01/17/01     House/ 1st reading (Introduced)             CLERK
02/27/01     Senate/ passed 3rd reading                  SEN
03/19/01     Governor Signed                             EXEC
";
        let profile = Jurisdiction::Ut.profile();
        let history = extract_history(body, SiteVersion::UtStatusText, &profile).unwrap_or_default();
        let rows: Vec<(&str, &str)> = history
            .iter()
            .map(|e| (e.date.as_str(), e.action.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("2001-01-15", "H - Bill Numbered but not Distributed"),
                ("2001-01-16", "H - Numbered Bill Publicly Distributed"),
                ("2001-01-17", "H - House/ 1st reading (Introduced)"),
                ("2001-02-27", "S - Senate/ passed 3rd reading"),
                ("2001-03-19", "H - Governor Signed"),
            ]
        );
    }

    #[test]
    fn test_illinois_status_page() {
        let body = r#"<html><body><pre>
   JAN-05-2001  H  FILED WITH CLERK
   JAN-10-2001  H  FIRST READING
   JAN-10-2001  H  REFERRED TO RULES COMMITTEE
   FEB-15-2001  S  ARRIVE IN SENATE
   MAR-01-2001     PUBLIC ACT 92-0001
</pre></body></html>"#;
        let profile = Jurisdiction::Il.profile();
        let history = extract_history(body, SiteVersion::IlStatusText, &profile).unwrap_or_default();
        let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            [
                "H - FILED WITH CLERK",
                "H - FIRST READING",
                "H - REFERRED TO RULES COMMITTEE",
                "S - ARRIVE IN SENATE",
                "H - PUBLIC ACT 92-0001",
            ]
        );
        assert_eq!(history[0].date, "2001-01-05");
        assert_eq!(history[3].date, "2001-02-15");
    }

    #[test]
    fn test_illinois_short_dates() {
        let body = "<pre>98-01-22  H  FIRST READING\n98-02-03  H  ASSIGNED TO EDUCATION</pre>";
        let profile = Jurisdiction::Il.profile();
        let history = extract_history(body, SiteVersion::IlStatusText, &profile).unwrap_or_default();
        assert_eq!(history[0].date, "1998-01-22");
        assert_eq!(history[1].action, "H - ASSIGNED TO EDUCATION");
    }

    #[test]
    fn test_no_status_lines_is_not_found() {
        let profile = Jurisdiction::Ut.profile();
        assert_eq!(
            extract_history("Bill not found", SiteVersion::UtStatusText, &profile),
            Extraction::NotFound
        );
    }
}
