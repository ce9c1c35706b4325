//! Manifest-driven scraping of many bills.
//!
//! Each bill runs its stages independently: a failed sponsors or votes stage
//! is logged and recorded in the [`BatchReport`] while the other fragments are
//! still written. A failed bill never stops the run.

use std::{
    collections::HashMap,
    fmt::Display,
    sync::{Arc, Mutex},
};

use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};

use crate::{
    history::{SiteVersion, extract_history},
    jurisdiction::JurisdictionProfile,
    metadata::{BillPage, PageMetadata, extract_metadata, nv_status_listing},
    output::{OutputError, OutputStore},
    scraper::{ScraperError, WebScraper},
    sources::{SourceError, az, ga},
    sponsors::extract_sponsors,
    types::{BillHistory, BillKey, BillRecord, BillSponsors, HistoryEntry, Jurisdiction, SponsorEntry, VoteRecord},
    votes::{VoteError, VoteFormat, VoteLink, extract_roll_call, find_vote_links},
};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// One bill to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub uuid: Option<String>,
    pub state: Jurisdiction,
    pub session: String,
    pub state_bill_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub state_url: String,
    /// History page when it is not `state_url`.
    #[serde(default)]
    pub history_url: Option<String>,
    /// Page listing the roll-call links when it is not `state_url`.
    #[serde(default)]
    pub votes_url: Option<String>,
    #[serde(default)]
    pub site_version: Option<SiteVersion>,
    #[serde(default)]
    pub vote_format: Option<VoteFormat>,
    /// Numeric session id for the Arizona API, looked up by session name when absent.
    #[serde(default)]
    pub source_session_id: Option<u32>,
    /// Session-wide status listing (Nevada `ABStatus.cfm` / `SBStatus.cfm`).
    #[serde(default)]
    pub status_index_url: Option<String>,
}

impl ManifestEntry {
    pub fn key(&self) -> BillKey {
        match &self.uuid {
            Some(uuid) => BillKey {
                uuid: uuid.clone(),
                state: self.state,
                session: self.session.clone(),
                state_bill_id: self.state_bill_id.clone(),
            },
            None => BillKey::new(self.state, &self.session, &self.state_bill_id),
        }
    }

    pub fn site_version(&self) -> Option<SiteVersion> {
        self.site_version
            .or_else(|| SiteVersion::for_session(self.state, &self.session))
    }

    pub fn vote_format(&self) -> Option<VoteFormat> {
        self.vote_format.or_else(|| VoteFormat::for_jurisdiction(self.state))
    }

    /// The bill id as status listings print it: `AB 12` -> `AB12`.
    pub fn listing_id(&self) -> String {
        self.state_bill_id
            .split_whitespace()
            .collect::<String>()
            .to_uppercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    History,
    Metadata,
    Sponsors,
    Votes,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::History => "history",
            Stage::Metadata => "metadata",
            Stage::Sponsors => "sponsors",
            Stage::Votes => "votes",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillFailure {
    pub uuid: String,
    pub stage: Stage,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub bills: usize,
    pub succeeded: usize,
    pub votes_written: usize,
    pub failures: Vec<BillFailure>,
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "┌─ Batch: {} bill(s), {} without errors", self.bills, self.succeeded)?;
        writeln!(f, "│  Votes written: {}", self.votes_written)?;
        for failure in &self.failures {
            writeln!(f, "│  ✗ {} [{}] {}", failure.uuid, failure.stage, failure.error)?;
        }
        write!(f, "└─ {} failure(s)", self.failures.len())
    }
}

/// Result of one bill's stages.
#[derive(Debug, Default)]
struct BillOutcome {
    votes_written: usize,
    failures: Vec<BillFailure>,
}

impl BillOutcome {
    fn fail(&mut self, key: &BillKey, stage: Stage, error: impl Display) {
        log::warn!("[{}] {} stage failed: {}", key.uuid, stage, error);
        self.failures.push(BillFailure {
            uuid: key.uuid.clone(),
            stage,
            error: error.to_string(),
        });
    }
}

/// Metadata, history and sponsors found on a bill's HTML pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtraction {
    pub metadata: BillRecord,
    pub history: Vec<HistoryEntry>,
    pub sponsors: Vec<SponsorEntry>,
}

/// Runs the history, metadata and sponsor extractors over already fetched pages.
///
/// Manifest values win over page values. Status comes from the manifest, then
/// the session status listing, then the bill page, then the latest history action.
pub fn extract_pages(
    entry: &ManifestEntry,
    profile: &JurisdictionProfile,
    bill_html: &str,
    history_html: &str,
    listed_status: Option<&str>,
) -> PageExtraction {
    let history = match entry.site_version() {
        Some(site) => extract_history(history_html, site, profile).unwrap_or_default(),
        None => {
            log::debug!("No history layout known for {} {}", entry.state, entry.session);
            Vec::new()
        }
    };

    let page = BillPage::for_jurisdiction(entry.state);
    let scraped = page
        .map(|p| extract_metadata(bill_html, p).unwrap_or_default())
        .unwrap_or_default();
    let PageMetadata {
        title,
        description,
        status,
    } = scraped;

    let metadata = BillRecord {
        key: entry.key(),
        title: entry.title.clone().or(title).unwrap_or_default(),
        description: entry.description.clone().or(description),
        status: entry
            .status
            .clone()
            .or_else(|| listed_status.map(str::to_string))
            .or(status)
            .or_else(|| history.last().map(|h| h.action.clone())),
        state_url: entry.state_url.clone(),
    };

    let sponsors = page
        .map(|p| extract_sponsors(bill_html, p, profile.sponsor_rule).unwrap_or_default())
        .unwrap_or_default();

    PageExtraction {
        metadata,
        history,
        sponsors,
    }
}

/// Votes printed in a journal document. The whole page is one roll call.
pub fn journal_votes(
    journal: &str,
    key: &BillKey,
    profile: &JurisdictionProfile,
) -> Result<Vec<VoteRecord>, VoteError> {
    let roll_call = extract_roll_call(journal, VoteFormat::SectionedText, profile, &key.session)?;
    Ok(roll_call
        .found()
        .map(|rc| rc.into_record(key.clone(), None, profile))
        .into_iter()
        .collect())
}

type StatusIndex = Arc<HashMap<String, String>>;

pub struct BatchRunner {
    scraper: WebScraper,
    store: OutputStore,
    concurrency: usize,
    status_indexes: Mutex<HashMap<String, StatusIndex>>,
}

impl BatchRunner {
    pub fn new(scraper: WebScraper, store: OutputStore, concurrency: usize) -> Self {
        Self {
            scraper,
            store,
            concurrency: concurrency.max(1),
            status_indexes: Mutex::new(HashMap::new()),
        }
    }

    pub async fn run(&self, entries: Vec<ManifestEntry>) -> Result<BatchReport, OutputError> {
        self.store.ensure()?;
        let bills = entries.len();
        log::info!("Scraping {} bill(s) with concurrency {}", bills, self.concurrency);

        let outcomes: Vec<BillOutcome> = stream::iter(entries)
            .map(|entry| async move { self.scrape_bill(&entry).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = BatchReport {
            bills,
            ..Default::default()
        };
        for outcome in outcomes {
            if outcome.failures.is_empty() {
                report.succeeded += 1;
            }
            report.votes_written += outcome.votes_written;
            report.failures.extend(outcome.failures);
        }
        report.failures.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        self.store.write_failures(&report.failures)?;
        Ok(report)
    }

    async fn scrape_bill(&self, entry: &ManifestEntry) -> BillOutcome {
        let key = entry.key();
        let profile = entry.state.profile();
        log::info!("[{}] {}", key.uuid, key);
        match entry.state {
            Jurisdiction::Az => self.scrape_az(entry, &key, &profile).await,
            Jurisdiction::Ga => self.scrape_ga(entry, &key, &profile).await,
            _ => self.scrape_html(entry, &key, &profile).await,
        }
    }

    /// Fetches `url` unless it is absent or the bill page itself.
    async fn fetch_or_reuse(
        &self,
        url: Option<&str>,
        entry: &ManifestEntry,
        bill_html: &str,
    ) -> Result<String, ScraperError> {
        match url {
            Some(url) if url != entry.state_url => self.scraper.get_html(url).await,
            _ => Ok(bill_html.to_string()),
        }
    }

    /// Fetches and parses a status listing once per run; later bills reuse it.
    async fn status_index(&self, url: &str) -> Result<StatusIndex, ScraperError> {
        if let Some(index) = self.cached_index(url) {
            return Ok(index);
        }
        let html = self.scraper.get_html(url).await?;
        let index: StatusIndex = Arc::new(nv_status_listing(&html));
        log::debug!("{} statuses listed at {}", index.len(), url);
        if let Ok(mut cache) = self.status_indexes.lock() {
            cache.insert(url.to_string(), Arc::clone(&index));
        }
        Ok(index)
    }

    fn cached_index(&self, url: &str) -> Option<StatusIndex> {
        self.status_indexes.lock().ok()?.get(url).cloned()
    }

    async fn scrape_html(&self, entry: &ManifestEntry, key: &BillKey, profile: &JurisdictionProfile) -> BillOutcome {
        let mut outcome = BillOutcome::default();

        let bill_html = match self.scraper.get_html(&entry.state_url).await {
            Ok(html) => html,
            Err(e) => {
                outcome.fail(key, Stage::Fetch, e);
                return outcome;
            }
        };
        let history_html = match self.fetch_or_reuse(entry.history_url.as_deref(), entry, &bill_html).await {
            Ok(html) => html,
            Err(e) => {
                outcome.fail(key, Stage::History, e);
                String::new()
            }
        };

        let listed_status = match &entry.status_index_url {
            Some(url) => match self.status_index(url).await {
                Ok(index) => index.get(&entry.listing_id()).cloned(),
                Err(e) => {
                    outcome.fail(key, Stage::Metadata, e);
                    None
                }
            },
            None => None,
        };

        let pages = extract_pages(entry, profile, &bill_html, &history_html, listed_status.as_deref());
        self.write_fragments(key, pages.metadata, pages.history, pages.sponsors, &mut outcome);

        if let Some(format) = entry.vote_format() {
            let votes_base = entry.votes_url.as_deref().unwrap_or(&entry.state_url);
            let votes_html = match self.fetch_or_reuse(entry.votes_url.as_deref(), entry, &bill_html).await {
                Ok(html) => html,
                Err(e) => {
                    outcome.fail(key, Stage::Votes, e);
                    return outcome;
                }
            };
            if format == VoteFormat::SectionedText {
                match journal_votes(&votes_html, key, profile) {
                    Ok(votes) => self.write_votes(key, &votes, &mut outcome),
                    Err(e) => outcome.fail(key, Stage::Votes, e),
                }
                return outcome;
            }

            let links = find_vote_links(&votes_html, votes_base, format);
            let mut votes = Vec::new();
            for link in &links {
                match self.fetch_vote(link, format, key, profile).await {
                    Ok(Some(vote)) => votes.push(vote),
                    Ok(None) => log::debug!("[{}] no roll call at {}", key.uuid, link.url),
                    Err(e) => outcome.fail(key, Stage::Votes, e),
                }
            }
            self.write_votes(key, &votes, &mut outcome);
        }
        outcome
    }

    async fn fetch_vote(
        &self,
        link: &VoteLink,
        format: VoteFormat,
        key: &BillKey,
        profile: &JurisdictionProfile,
    ) -> Result<Option<VoteRecord>, BatchError> {
        let body = self.scraper.get_html(&link.url).await?;
        let roll_call = extract_roll_call(&body, format, profile, &key.session)?;
        Ok(roll_call
            .found()
            .map(|rc| rc.into_record(key.clone(), Some(link), profile)))
    }

    async fn scrape_az(&self, entry: &ManifestEntry, key: &BillKey, profile: &JurisdictionProfile) -> BillOutcome {
        let mut outcome = BillOutcome::default();
        let session_id = match self.az_session_id(entry).await {
            Ok(id) => id,
            Err(e) => {
                outcome.fail(key, Stage::Fetch, e);
                return outcome;
            }
        };

        let actions: Vec<az::AzStatusAction> = match self
            .scraper
            .get_json(&az::status_overview_url(&entry.state_bill_id, session_id))
            .await
        {
            Ok(actions) => actions,
            Err(e) => {
                outcome.fail(key, Stage::History, e);
                Vec::new()
            }
        };
        let history = az::history(&actions, profile);

        let bill: az::AzBill = match self.scraper.get_json(&az::bill_url(&entry.state_bill_id, session_id)).await {
            Ok(bill) => bill,
            Err(e) => {
                outcome.fail(key, Stage::Metadata, e);
                self.write_history(key, history, &mut outcome);
                return outcome;
            }
        };
        let metadata = az::metadata(&bill, key.clone(), az::last_status(&actions), session_id);

        let sponsors = match self
            .scraper
            .get_json::<Vec<az::AzSponsor>>(&az::sponsors_url(bill.bill_id))
            .await
        {
            Ok(list) => az::sponsors(&list, profile),
            Err(e) => {
                outcome.fail(key, Stage::Sponsors, e);
                Vec::new()
            }
        };
        self.write_fragments(key, metadata, history, sponsors, &mut outcome);

        let mut votes = Vec::new();
        for action in &actions {
            match self.fetch_az_vote(bill.bill_id, action, key, profile).await {
                Ok(Some(vote)) => votes.push(vote),
                Ok(None) => {}
                Err(e) => outcome.fail(key, Stage::Votes, e),
            }
        }
        self.write_votes(key, &votes, &mut outcome);
        outcome
    }

    async fn az_session_id(&self, entry: &ManifestEntry) -> Result<u32, BatchError> {
        if let Some(id) = entry.source_session_id {
            return Ok(id);
        }
        let sessions: Vec<az::AzSession> = self.scraper.get_json(&az::sessions_url()).await?;
        let id = az::session_id(&sessions, &entry.session)?;
        log::debug!("AZ session '{}' has id {}", entry.session, id);
        Ok(id)
    }

    async fn fetch_az_vote(
        &self,
        bill_id: u64,
        action: &az::AzStatusAction,
        key: &BillKey,
        profile: &JurisdictionProfile,
    ) -> Result<Option<VoteRecord>, BatchError> {
        let url = az::floor_action_url(bill_id, action.bill_status_action_id);
        let floor: Vec<az::AzFloorAction> = self.scraper.get_json(&url).await?;
        match floor.first() {
            Some(first) => Ok(az::vote(first, key.clone(), profile)?),
            None => Ok(None),
        }
    }

    async fn scrape_ga(&self, entry: &ManifestEntry, key: &BillKey, profile: &JurisdictionProfile) -> BillOutcome {
        let mut outcome = BillOutcome::default();
        match ga::session_site_id(&entry.session) {
            Ok(site_id) => log::debug!("[{}] GA session {} is site {}", key.uuid, entry.session, site_id),
            Err(e) => {
                outcome.fail(key, Stage::Fetch, e);
                return outcome;
            }
        }
        let instrument: ga::GaInstrument = match self.scraper.get_json(&entry.state_url).await {
            Ok(instrument) => instrument,
            Err(e) => {
                outcome.fail(key, Stage::Fetch, e);
                return outcome;
            }
        };
        let mut metadata = ga::metadata(&instrument, &entry.session);
        metadata.key = key.clone();
        let history = ga::history(&instrument.status_history, profile);
        let sponsors = ga::sponsors(&instrument.authors, profile);
        self.write_fragments(key, metadata, history, sponsors, &mut outcome);

        if let Some(url) = &entry.votes_url {
            match self.scraper.get_json::<Vec<ga::GaRollCall>>(url).await {
                Ok(roll_calls) => {
                    let mut votes = Vec::new();
                    for roll_call in &roll_calls {
                        match ga::vote(roll_call, key.clone(), profile) {
                            Ok(vote) => votes.push(vote),
                            Err(e) => outcome.fail(key, Stage::Votes, e),
                        }
                    }
                    self.write_votes(key, &votes, &mut outcome);
                }
                Err(e) => outcome.fail(key, Stage::Votes, e),
            }
        }
        outcome
    }

    fn write_history(&self, key: &BillKey, history: Vec<HistoryEntry>, outcome: &mut BillOutcome) {
        let record = BillHistory {
            key: key.clone(),
            history,
        };
        if let Err(e) = self.store.write_history(&record) {
            outcome.fail(key, Stage::History, e);
        }
    }

    fn write_fragments(
        &self,
        key: &BillKey,
        metadata: BillRecord,
        history: Vec<HistoryEntry>,
        sponsors: Vec<SponsorEntry>,
        outcome: &mut BillOutcome,
    ) {
        self.write_history(key, history, outcome);
        if let Err(e) = self.store.write_metadata(&metadata) {
            outcome.fail(key, Stage::Metadata, e);
        }
        let sponsors = BillSponsors {
            key: key.clone(),
            sponsors,
        };
        if let Err(e) = self.store.write_sponsors(&sponsors) {
            outcome.fail(key, Stage::Sponsors, e);
        }
    }

    fn write_votes(&self, key: &BillKey, votes: &[VoteRecord], outcome: &mut BillOutcome) {
        match self.store.write_votes(votes) {
            Ok(paths) => outcome.votes_written += paths.len(),
            Err(e) => outcome.fail(key, Stage::Votes, e),
        }
    }
}
