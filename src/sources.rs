//! Source catalog locations and the concurrent fetch fan-out.
//!
//! Every source kind maps to one JSON document under a shared root, which is
//! either an HTTP base URL or a local directory. Fetching never fails as a
//! whole: each document is retrieved independently and an unreachable,
//! non-success, or non-array document degrades to an empty record list for
//! that kind only.

use crate::catalog::LooseCategory;
use anyhow::{Context, Result, bail};
use futures::future::join_all;
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Public mirror of the item catalogs.
pub const DEFAULT_SOURCE_ROOT: &str =
    "https://raw.githubusercontent.com/ByMykel/CSGO-API/main/public/api/en";
pub const SOURCE_ROOT_ENV: &str = "SKINDEX_SOURCE_ROOT";
pub const TIMEOUT_ENV: &str = "SKINDEX_TIMEOUT_SECS";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("skindex/", env!("CARGO_PKG_VERSION"));

/// One independently fetched catalog document.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SourceKind {
    BaseItems,
    Crates,
    Collections,
    Agents,
    Stickers,
    Patches,
    Graffiti,
    MusicKits,
    Tools,
    Keychains,
}

impl SourceKind {
    pub const ALL: [SourceKind; 10] = [
        SourceKind::BaseItems,
        SourceKind::Crates,
        SourceKind::Collections,
        SourceKind::Agents,
        SourceKind::Stickers,
        SourceKind::Patches,
        SourceKind::Graffiti,
        SourceKind::MusicKits,
        SourceKind::Tools,
        SourceKind::Keychains,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::BaseItems => "skins",
            SourceKind::Crates => "crates",
            SourceKind::Collections => "collections",
            SourceKind::Agents => "agents",
            SourceKind::Stickers => "stickers",
            SourceKind::Patches => "patches",
            SourceKind::Graffiti => "graffiti",
            SourceKind::MusicKits => "music_kits",
            SourceKind::Tools => "tools",
            SourceKind::Keychains => "keychains",
        }
    }

    /// Document name under the source root.
    pub fn document_name(self) -> String {
        format!("{}.json", self.as_str())
    }

    /// The loose category this source feeds, if it is passed through as-is.
    pub fn loose_category(self) -> Option<LooseCategory> {
        match self {
            SourceKind::Agents => Some(LooseCategory::Agents),
            SourceKind::Stickers => Some(LooseCategory::Stickers),
            SourceKind::Patches => Some(LooseCategory::Patches),
            SourceKind::Graffiti => Some(LooseCategory::Graffiti),
            SourceKind::MusicKits => Some(LooseCategory::MusicKits),
            SourceKind::Tools => Some(LooseCategory::Tools),
            SourceKind::Keychains => Some(LooseCategory::Keychains),
            SourceKind::BaseItems | SourceKind::Crates | SourceKind::Collections => None,
        }
    }
}

/// Where a document (or the root holding all documents) lives.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SourceLocation {
    Http(String),
    File(PathBuf),
}

impl SourceLocation {
    /// `http://` and `https://` prefixes select HTTP; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            SourceLocation::Http(trimmed.to_string())
        } else {
            SourceLocation::File(PathBuf::from(trimmed))
        }
    }

    fn join(&self, name: &str) -> Self {
        match self {
            SourceLocation::Http(base) => {
                SourceLocation::Http(format!("{}/{}", base.trim_end_matches('/'), name))
            }
            SourceLocation::File(dir) => SourceLocation::File(dir.join(name)),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Http(url) => f.write_str(url),
            SourceLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolved location of every source document plus fetch settings.
#[derive(Clone, Debug)]
pub struct SourceSet {
    locations: BTreeMap<SourceKind, SourceLocation>,
    timeout: Duration,
}

impl SourceSet {
    /// Place every document under `root` with its default name.
    pub fn from_root(root: &str) -> Self {
        let root = SourceLocation::parse(root);
        let locations = SourceKind::ALL
            .into_iter()
            .map(|kind| (kind, root.join(&kind.document_name())))
            .collect();
        Self {
            locations,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Resolve the root from an explicit override, then `SKINDEX_SOURCE_ROOT`,
    /// then the public default; the timeout comes from `SKINDEX_TIMEOUT_SECS`.
    pub fn from_env(root_override: Option<&str>) -> Result<Self> {
        Self::from_lookup(root_override, |key| env::var(key).ok())
    }

    /// Same resolution as [`SourceSet::from_env`], reading variables through
    /// `lookup` instead of the process environment.
    pub fn from_lookup(
        root_override: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let root = root_override
            .map(str::to_string)
            .or_else(|| lookup(SOURCE_ROOT_ENV).filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_SOURCE_ROOT.to_string());

        let mut set = Self::from_root(&root);
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"))?;
            if secs == 0 {
                bail!("{TIMEOUT_ENV} must be greater than zero");
            }
            set.timeout = Duration::from_secs(secs);
        }
        Ok(set)
    }

    /// Point one kind at a different document.
    pub fn with_location(mut self, kind: SourceKind, location: SourceLocation) -> Self {
        self.locations.insert(kind, location);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn location(&self, kind: SourceKind) -> Option<&SourceLocation> {
        self.locations.get(&kind)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceKind, &SourceLocation)> {
        self.locations.iter().map(|(kind, location)| (*kind, location))
    }
}

/// How a single retrieval settled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SourceStatus {
    Loaded,
    /// The document was replaced by an empty list; `reason` is informational.
    Fallback { reason: String },
}

/// Settled result of fetching one document.
#[derive(Clone, Debug)]
pub struct Fetched {
    pub kind: SourceKind,
    pub location: SourceLocation,
    pub status: SourceStatus,
    pub records: Vec<Value>,
}

impl Fetched {
    pub fn is_fallback(&self) -> bool {
        matches!(self.status, SourceStatus::Fallback { .. })
    }
}

/// Every settled retrieval of one load, indexed by kind.
#[derive(Clone, Debug, Default)]
pub struct FetchedSources {
    by_kind: BTreeMap<SourceKind, Fetched>,
}

impl FetchedSources {
    /// Raw records of one kind; kinds never fetched read as empty.
    pub fn records(&self, kind: SourceKind) -> &[Value] {
        self.by_kind
            .get(&kind)
            .map(|fetched| fetched.records.as_slice())
            .unwrap_or_default()
    }

    pub fn get(&self, kind: SourceKind) -> Option<&Fetched> {
        self.by_kind.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fetched> {
        self.by_kind.values()
    }

    /// Kinds whose document degraded to the empty fallback.
    pub fn fallbacks(&self) -> impl Iterator<Item = &Fetched> {
        self.by_kind.values().filter(|fetched| fetched.is_fallback())
    }
}

impl FromIterator<Fetched> for FetchedSources {
    fn from_iter<I: IntoIterator<Item = Fetched>>(iter: I) -> Self {
        Self {
            by_kind: iter.into_iter().map(|fetched| (fetched.kind, fetched)).collect(),
        }
    }
}

/// HTTP/file retriever shared by every document of a load.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch every document concurrently and wait for all of them to settle.
    ///
    /// Never fails: each retrieval catches its own error and substitutes an
    /// empty record list, so the join only ever sees settled values.
    pub async fn fetch_all(&self, sources: &SourceSet) -> FetchedSources {
        let futures = sources
            .iter()
            .map(|(kind, location)| self.fetch_one(kind, location.clone()));
        join_all(futures).await.into_iter().collect()
    }

    async fn fetch_one(&self, kind: SourceKind, location: SourceLocation) -> Fetched {
        match self.retrieve(&location).await {
            Ok(records) => {
                debug!(
                    source = kind.as_str(),
                    location = %location,
                    records = records.len(),
                    "source loaded"
                );
                Fetched {
                    kind,
                    location,
                    status: SourceStatus::Loaded,
                    records,
                }
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(
                    source = kind.as_str(),
                    location = %location,
                    error = %reason,
                    "source unavailable, continuing with an empty list"
                );
                Fetched {
                    kind,
                    location,
                    status: SourceStatus::Fallback { reason },
                    records: Vec::new(),
                }
            }
        }
    }

    async fn retrieve(&self, location: &SourceLocation) -> Result<Vec<Value>> {
        let body = match location {
            SourceLocation::Http(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("requesting {url}"))?;
                let status = response.status();
                if !status.is_success() {
                    bail!("{url} answered with status {status}");
                }
                response
                    .bytes()
                    .await
                    .with_context(|| format!("reading body of {url}"))?
                    .to_vec()
            }
            SourceLocation::File(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?,
        };
        parse_document(&body)
    }
}

/// Parse a document body that must be a JSON array of records.
pub fn parse_document(body: &[u8]) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_slice(body).context("document is not valid JSON")?;
    match value {
        Value::Array(records) => Ok(records),
        other => bail!("expected a JSON array, found {}", json_type(&other)),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
