//! AQL (Artifactory Query Language) construction.
//!
//! Only the subset the statistics endpoint needs:
//!
//! ```text
//! items.find(<criteria>).include(<fields>).sort({"$desc":[<field>]}).limit(<n>)
//! ```
//!
//! Criteria values are rendered as JSON string literals, so a repository
//! name containing `"` or `\` cannot close the criteria object early and
//! inject extra clauses.

use std::fmt;

use serde_json::Value;

/// Field holding the per-item download counter.
pub const DOWNLOADS_FIELD: &str = "stat.downloads";

/// An `items.find(...)` query.
///
/// ```rust
/// use dlstats::aql::ItemsQuery;
///
/// let q = ItemsQuery::new("libs-release")
///     .min_downloads(1)
///     .include("stat")
///     .sort_desc("stat.downloads")
///     .limit(5);
///
/// assert_eq!(
///     q.to_string(),
///     r#"items.find({"repo":"libs-release","stat.downloads":{"$gte":"1"}}).include("stat").sort({"$desc":["stat.downloads"]}).limit(5)"#,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsQuery {
    repo: String,
    min_downloads: Option<u64>,
    include: Vec<String>,
    sort_desc: Option<String>,
    limit: Option<usize>,
}

impl ItemsQuery {
    /// Items stored in `repo`.
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            min_downloads: None,
            include: Vec::new(),
            sort_desc: None,
            limit: None,
        }
    }

    /// Only items downloaded at least `n` times.
    pub fn min_downloads(mut self, n: u64) -> Self {
        self.min_downloads = Some(n);
        self
    }

    /// Adds a domain (e.g. `"stat"`) to the returned fields.
    pub fn include(mut self, field: impl Into<String>) -> Self {
        self.include.push(field.into());
        self
    }

    pub fn sort_desc(mut self, field: impl Into<String>) -> Self {
        self.sort_desc = Some(field.into());
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

impl fmt::Display for ItemsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "items.find({{\"repo\":{}", literal(&self.repo))?;
        if let Some(n) = self.min_downloads {
            // AQL compares stat values given as strings.
            let min = literal(&n.to_string());
            write!(f, ",{}:{{\"$gte\":{min}}}", literal(DOWNLOADS_FIELD))?;
        }
        f.write_str("})")?;

        if !self.include.is_empty() {
            let fields: Vec<String> = self.include.iter().map(|s| literal(s)).collect();
            write!(f, ".include({})", fields.join(","))?;
        }
        if let Some(field) = &self.sort_desc {
            write!(f, ".sort({{\"$desc\":[{}]}})", literal(field))?;
        }
        if let Some(n) = self.limit {
            write!(f, ".limit({n})")?;
        }
        Ok(())
    }
}

/// Query for the items of `repo` with at least one download, including their
/// download stats. With a limit the result is also sorted by downloads,
/// highest first, and capped server-side.
pub fn downloads_query(repo: &str, limit: Option<usize>) -> String {
    let query = ItemsQuery::new(repo).min_downloads(1).include("stat");
    match limit {
        Some(n) => query.sort_desc(DOWNLOADS_FIELD).limit(n).to_string(),
        None => query.to_string(),
    }
}

/// Renders `s` as a JSON string literal, quotes included.
fn literal(s: &str) -> String {
    Value::from(s).to_string()
}
