//! Top-downloads statistics.
//!
//! The pipeline behind `GET /v1/stats/downloads/{repo}`:
//!
//! ```text
//! limit ─► downloads_query ─► AqlClient::execute ─► parse_results
//!                                                        │
//!          Vec<DownloadRecord> ◄── rank_top ◄── into_records
//! ```
//!
//! Ranking keeps every qualifying item, sorts by download count (highest
//! first, ties in the order Artifactory returned them) and keeps the first
//! `limit`. The limit is also sent to Artifactory so it does the heavy
//! lifting; truncating again locally keeps the contract when it doesn't.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aql;
use crate::artifactory::AqlClient;
use crate::error::{DecodeError, StatsError};

/// Number of records returned when the caller gives no `limit`.
pub const DEFAULT_LIMIT: usize = 2;

/// One artifact and how often it was downloaded. This is the wire shape of
/// the endpoint's response array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRecord {
    pub repo_name: String,
    pub artifact_name: String,
    pub downloads: u64,
}

/// One item of an AQL `items.find` answer, reduced to what ranking needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawArtifactEntry {
    pub name: String,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
}

/// One entry of an item's `stats` domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StatEntry {
    #[serde(default)]
    pub downloads: u64,
}

impl RawArtifactEntry {
    /// Downloads according to the first stats entry, `None` when Artifactory
    /// sent no stats at all.
    pub fn downloads(&self) -> Option<u64> {
        self.stats.first().map(|s| s.downloads)
    }
}

#[derive(Deserialize)]
struct AqlResults {
    #[serde(default)]
    results: Vec<RawArtifactEntry>,
}

/// Decodes an AQL answer: `{"results":[{"name":..,"stats":[{"downloads":..}]}]}`.
///
/// Fields other than `name` and `stats[].downloads` are ignored; a missing
/// `results` array means no items.
pub fn parse_results(raw: &[u8]) -> Result<Vec<RawArtifactEntry>, DecodeError> {
    let parsed: AqlResults = serde_json::from_slice(raw)?;
    Ok(parsed.results)
}

/// Attaches `repo` to every entry.
///
/// # Errors
///
/// [`DecodeError::MissingStats`] for the first entry with an empty `stats`
/// array.
pub fn into_records(
    repo: &str,
    entries: Vec<RawArtifactEntry>,
) -> Result<Vec<DownloadRecord>, DecodeError> {
    entries
        .into_iter()
        .map(|entry| -> Result<DownloadRecord, DecodeError> {
            let downloads = entry
                .downloads()
                .ok_or_else(|| DecodeError::MissingStats(entry.name.clone()))?;
            Ok(DownloadRecord {
                repo_name: repo.to_owned(),
                artifact_name: entry.name,
                downloads,
            })
        })
        .collect()
}

/// Highest download counts first, ties in input order, at most `limit`.
pub fn rank_top(mut records: Vec<DownloadRecord>, limit: usize) -> Vec<DownloadRecord> {
    // stable: equal counts keep their relative order
    records.sort_by(|a, b| b.downloads.cmp(&a.downloads));
    records.truncate(limit);
    records
}

/// Parses the `limit` query parameter.
///
/// Absent or empty means [`DEFAULT_LIMIT`]. Anything that is not a positive
/// integer is an [`StatsError::InvalidLimit`] carrying the parser's message.
pub fn parse_limit(raw: Option<&str>) -> Result<usize, StatsError> {
    match raw {
        None | Some("") => Ok(DEFAULT_LIMIT),
        Some(s) => Ok(s.parse::<NonZeroUsize>()?.get()),
    }
}

/// Runs the whole pipeline for `repo`.
pub async fn top_downloads(
    client: &dyn AqlClient,
    repo: &str,
    limit: usize,
) -> Result<Vec<DownloadRecord>, StatsError> {
    let query = aql::downloads_query(repo, Some(limit));
    let raw = client.execute(&query).await?;

    let entries = parse_results(&raw)?;
    debug!(repo, items = entries.len(), "AQL results decoded");

    let records = into_records(repo, entries)?;
    Ok(rank_top(records, limit))
}
