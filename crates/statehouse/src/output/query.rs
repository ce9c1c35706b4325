use std::{fmt::Display, fs, path::Path};

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use super::{Collection, OutputError};
use crate::types::{BillFilter, BillKey};

/// Everything known about the bills matching a filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct QueryResult {
    pub metadata: Vec<Value>,
    pub bill_history: Vec<Value>,
    pub sponsors: Vec<Value>,
    pub votes: Vec<Value>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.bill_history.is_empty() && self.sponsors.is_empty() && self.votes.is_empty()
    }
}

impl Display for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for record in &self.metadata {
            let field = |name: &str| record.get(name).and_then(Value::as_str).unwrap_or("-").to_string();
            writeln!(f, "┌─ {} ─ {} {}", field("uuid"), field("state_bill_id"), field("session"))?;
            writeln!(f, "│  {}", field("title"))?;
            writeln!(f, "└─ {}", field("status"))?;
        }
        write!(
            f,
            "{} metadata · {} history · {} sponsor record(s) · {} vote(s)",
            self.metadata.len(),
            self.bill_history.len(),
            self.sponsors.len(),
            self.votes.len()
        )
    }
}

/// Loads one aggregate file. A missing aggregate is treated as empty.
fn load_aggregate(root: &Path, collection: Collection) -> Result<Vec<Value>, OutputError> {
    let path = root.join(collection.aggregate_file());
    if !path.exists() {
        log::warn!("{} not found; run combine first", path.display());
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| OutputError::io(&path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| OutputError::json(&path, e))?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

fn matching(records: Vec<Value>, filter: &BillFilter) -> Vec<Value> {
    records
        .into_iter()
        .filter(|record| {
            serde_json::from_value::<BillKey>(record.clone())
                .map(|key| key.matches(filter))
                .unwrap_or(false)
        })
        .collect()
}

/// Filters the combined aggregates under `root` by uuid or by state, session and bill id.
pub fn query(root: &Path, filter: &BillFilter) -> Result<QueryResult, OutputError> {
    Ok(QueryResult {
        metadata: matching(load_aggregate(root, Collection::BillMetadata)?, filter),
        bill_history: matching(load_aggregate(root, Collection::BillHistory)?, filter),
        sponsors: matching(load_aggregate(root, Collection::Sponsors)?, filter),
        votes: matching(load_aggregate(root, Collection::Votes)?, filter),
    })
}
