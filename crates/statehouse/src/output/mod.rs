//! On-disk JSON layout: one fragment per bill and record kind.
//!
//! ```text
//! <root>/bill_metadata/<uuid>.json
//! <root>/sponsors/<uuid>.json
//! <root>/bill_history/<uuid>.json
//! <root>/votes/<uuid>_<yyyymmdd | index>.json
//! <root>/failures.json
//! ```

pub mod combine;
pub mod query;

use std::{
    collections::HashMap,
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    dates::is_iso,
    types::{BillHistory, BillRecord, BillSponsors, VoteRecord},
};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl OutputError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        OutputError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        OutputError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The four record kinds, each with its own directory and aggregate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    BillMetadata,
    Sponsors,
    BillHistory,
    Votes,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::BillMetadata,
        Collection::Sponsors,
        Collection::BillHistory,
        Collection::Votes,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Collection::BillMetadata => "bill_metadata",
            Collection::Sponsors => "sponsors",
            Collection::BillHistory => "bill_history",
            Collection::Votes => "votes",
        }
    }

    pub fn aggregate_file(&self) -> String {
        format!("{}.json", self.dir_name())
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| OutputError::json(path, e))?;
    fs::write(path, json).map_err(|e| OutputError::io(path, e))
}

/// Per-vote file suffixes for one bill, in the order the votes are given.
///
/// A vote gets its date without dashes when that date is ISO and no other
/// vote of the bill shares it; otherwise it gets its 1-based position.
pub fn vote_file_suffixes(votes: &[VoteRecord]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for vote in votes {
        *seen.entry(vote.date.as_str()).or_default() += 1;
    }
    votes
        .iter()
        .enumerate()
        .map(|(i, vote)| {
            if is_iso(&vote.date) && seen.get(vote.date.as_str()) == Some(&1) {
                vote.date.replace('-', "")
            } else {
                (i + 1).to_string()
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.dir_name())
    }

    /// Creates the root and the four collection directories.
    pub fn ensure(&self) -> Result<(), OutputError> {
        for collection in Collection::ALL {
            let dir = self.dir(collection);
            fs::create_dir_all(&dir).map_err(|e| OutputError::io(&dir, e))?;
        }
        Ok(())
    }

    fn fragment_path(&self, collection: Collection, stem: &str) -> PathBuf {
        self.dir(collection).join(format!("{stem}.json"))
    }

    pub fn write_metadata(&self, record: &BillRecord) -> Result<PathBuf, OutputError> {
        let path = self.fragment_path(Collection::BillMetadata, &record.key.uuid);
        write_json(&path, record)?;
        Ok(path)
    }

    pub fn write_sponsors(&self, sponsors: &BillSponsors) -> Result<PathBuf, OutputError> {
        let path = self.fragment_path(Collection::Sponsors, &sponsors.key.uuid);
        write_json(&path, sponsors)?;
        Ok(path)
    }

    pub fn write_history(&self, history: &BillHistory) -> Result<PathBuf, OutputError> {
        let path = self.fragment_path(Collection::BillHistory, &history.key.uuid);
        write_json(&path, history)?;
        Ok(path)
    }

    /// Writes every vote of one bill. Re-running overwrites.
    pub fn write_votes(&self, votes: &[VoteRecord]) -> Result<Vec<PathBuf>, OutputError> {
        votes
            .iter()
            .zip(vote_file_suffixes(votes))
            .map(|(vote, suffix)| {
                let path = self.fragment_path(Collection::Votes, &format!("{}_{}", vote.key.uuid, suffix));
                write_json(&path, vote)?;
                Ok(path)
            })
            .collect()
    }

    pub fn write_failures<T: Serialize>(&self, failures: &[T]) -> Result<PathBuf, OutputError> {
        let path = self.root.join("failures.json");
        write_json(&path, failures)?;
        Ok(path)
    }
}
