use std::{fmt::Display, fs, path::Path};

use serde_json::Value;

use super::{Collection, OutputError, write_json};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineSummary {
    /// `(collection, records written, files skipped)`
    pub collections: Vec<(Collection, usize, usize)>,
}

impl Display for CombineSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "┌─ Combined output")?;
        for (collection, records, skipped) in &self.collections {
            writeln!(f, "│  {:<14} {:>6} record(s), {} skipped", collection.dir_name(), records, skipped)?;
        }
        write!(f, "└─ done")
    }
}

/// Reads every `.json` fragment of one collection in file-name order.
///
/// Top-level arrays are flattened. Files that cannot be read or parsed are
/// skipped with a warning. A missing directory yields no records.
pub fn read_collection(root: &Path, collection: Collection) -> Result<(Vec<Value>, usize), OutputError> {
    let dir = root.join(collection.dir_name());
    if !dir.exists() {
        log::warn!("No {} directory under {}", collection, root.display());
        return Ok((Vec::new(), 0));
    }

    let mut files: Vec<_> = fs::read_dir(&dir)
        .map_err(|e| OutputError::io(&dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();
    files.sort();

    let mut records = Vec::new();
    let mut skipped = 0;
    for path in files {
        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(Value::Array(items)) => records.extend(items),
            Ok(value) => records.push(value),
            Err(e) => {
                log::warn!("Skipping unreadable file {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }
    Ok((records, skipped))
}

/// Writes `bill_metadata.json`, `sponsors.json`, `bill_history.json` and `votes.json` under `root`.
pub fn combine(root: &Path) -> Result<CombineSummary, OutputError> {
    let mut summary = CombineSummary::default();
    for collection in Collection::ALL {
        let (records, skipped) = read_collection(root, collection)?;
        let path = root.join(collection.aggregate_file());
        write_json(&path, &records)?;
        log::info!("Wrote {} record(s) to {}", records.len(), path.display());
        summary.collections.push((collection, records.len(), skipped));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_combine_flattens_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "bill_metadata/b.json", r#"{"uuid": "B"}"#);
        write(root, "bill_metadata/a.json", r#"{"uuid": "A"}"#);
        write(root, "sponsors/a.json", r#"[{"uuid": "A"}, {"uuid": "A2"}]"#);
        write(root, "sponsors/broken.json", "{not json");
        write(root, "sponsors/notes.txt", "ignored");

        let summary = combine(root).unwrap();
        assert_eq!(
            summary.collections,
            [
                (Collection::BillMetadata, 2, 0),
                (Collection::Sponsors, 2, 1),
                (Collection::BillHistory, 0, 0),
                (Collection::Votes, 0, 0),
            ]
        );

        let metadata: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(root.join("bill_metadata.json")).unwrap()).unwrap();
        assert_eq!(metadata[0]["uuid"], "A");
        assert_eq!(metadata[1]["uuid"], "B");

        let votes = fs::read_to_string(root.join("votes.json")).unwrap();
        assert_eq!(votes.trim(), "[]");
    }
}
