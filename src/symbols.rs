//! Symbol resolution backed by a cached copy of the broker symbol master.
//!
//! The mapping (uppercased underlying → contracts) is rebuilt wholesale from
//! every configured source once the cache is older than
//! [`SYMBOL_CACHE_TTL`]. The cache file is replaced with a write-then-rename,
//! and its modification time is the cache age.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;
use futures_util::future::join_all;
use tokio::sync::Mutex;

use crate::client::default_headers;
use crate::constants::{DEFAULT_HTTP_TIMEOUT_SECS, SYMBOL_CACHE_TTL};
use crate::error::{PremiaError, Result};
use crate::persist::write_atomic;
use crate::types::Side;
use crate::types::symbols::{SymbolDetails, SymbolEntry};

/// Uppercased underlying name → every contract on it.
pub type SymbolMapping = BTreeMap<String, Vec<SymbolEntry>>;

struct LoadedMapping {
    mapping: Arc<SymbolMapping>,
    refreshed_at: SystemTime,
}

/// Resolves instrument names to broker symbols.
pub struct SymbolResolver {
    http: reqwest::Client,
    sources: Vec<String>,
    cache_path: PathBuf,
    allow_partial: bool,
    loaded: Mutex<Option<LoadedMapping>>,
}

impl SymbolResolver {
    /// Create a resolver that mirrors `sources` into `cache_path`.
    pub fn new(cache_path: impl Into<PathBuf>, sources: Vec<String>) -> Result<Self> {
        Ok(Self {
            http: Self::build_http(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))?,
            sources,
            cache_path: cache_path.into(),
            allow_partial: false,
            loaded: Mutex::new(None),
        })
    }

    /// Tolerate failing sources as long as at least one succeeds.
    ///
    /// Failures are still logged per source.
    pub fn allow_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Self::build_http(timeout)?;
        Ok(self)
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// All contracts whose underlying matches `instrument_name`
    /// (case-insensitive).
    pub async fn resolve(&self, instrument_name: &str) -> Result<Vec<SymbolEntry>> {
        let mapping = self.mapping().await?;
        let key = instrument_name.trim().to_uppercase();
        let entries = mapping.get(&key).filter(|e| !e.is_empty()).ok_or_else(|| {
            PremiaError::NotFound(format!("no symbols found for instrument: {instrument_name}"))
        })?;

        tracing::debug!(instrument = %key, count = entries.len(), "symbols resolved");
        Ok(entries.clone())
    }

    /// The contract of `instrument_name` expiring on `expiry` on the given side.
    ///
    /// When several strikes match, the lowest strike is returned; the option
    /// chain endpoint only needs one contract of the right series.
    pub async fn select_contract(
        &self,
        instrument_name: &str,
        expiry: NaiveDate,
        side: Side,
    ) -> Result<SymbolEntry> {
        self.resolve(instrument_name)
            .await?
            .into_iter()
            .filter(|e| {
                e.details.opt_type.eq_ignore_ascii_case(side.as_str())
                    && e.details.expiry() == Some(expiry)
            })
            .min_by(|a, b| a.details.strike_price.total_cmp(&b.details.strike_price))
            .ok_or_else(|| {
                PremiaError::NotFound(format!(
                    "no {side} contract for {instrument_name} expiring {expiry}"
                ))
            })
    }

    /// Drop the in-memory copy; the next lookup re-checks the cache file.
    pub async fn invalidate(&self) {
        *self.loaded.lock().await = None;
    }

    /// Current mapping, rebuilding it when both the in-memory copy and the
    /// cache file are older than the TTL.
    pub async fn mapping(&self) -> Result<Arc<SymbolMapping>> {
        let mut loaded = self.loaded.lock().await;
        let now = SystemTime::now();

        if let Some(current) = loaded.as_ref() {
            if is_fresh(current.refreshed_at, now) {
                return Ok(Arc::clone(&current.mapping));
            }
        }

        if let Some(cached) = self.read_cache(now).await? {
            let mapping = Arc::clone(&cached.mapping);
            *loaded = Some(cached);
            return Ok(mapping);
        }

        let mapping = Arc::new(self.fetch_all().await?);
        let json = serde_json::to_vec(mapping.as_ref())?;
        write_atomic(&self.cache_path, &json).await?;
        tracing::info!(
            path = %self.cache_path.display(),
            underlyings = mapping.len(),
            "symbol cache rebuilt"
        );

        *loaded = Some(LoadedMapping {
            mapping: Arc::clone(&mapping),
            refreshed_at: now,
        });
        Ok(mapping)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn build_http(timeout: Duration) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .default_headers(default_headers())
            .timeout(timeout)
            .build()?)
    }

    /// Load the cache file if it exists and is younger than the TTL.
    ///
    /// An unreadable or corrupt file counts as stale.
    async fn read_cache(&self, now: SystemTime) -> Result<Option<LoadedMapping>> {
        let meta = match tokio::fs::metadata(&self.cache_path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let modified = meta.modified()?;
        if !is_fresh(modified, now) {
            tracing::info!(path = %self.cache_path.display(), "symbol cache expired");
            return Ok(None);
        }

        let bytes = tokio::fs::read(&self.cache_path).await?;
        match serde_json::from_slice::<SymbolMapping>(&bytes) {
            Ok(mapping) => {
                tracing::debug!(path = %self.cache_path.display(), "symbol cache loaded");
                Ok(Some(LoadedMapping {
                    mapping: Arc::new(mapping),
                    refreshed_at: modified,
                }))
            }
            Err(e) => {
                tracing::warn!(path = %self.cache_path.display(), error = %e, "symbol cache unreadable");
                Ok(None)
            }
        }
    }

    /// Fetch every source concurrently and merge them.
    async fn fetch_all(&self) -> Result<SymbolMapping> {
        let results = join_all(self.sources.iter().map(|url| self.fetch_source(url))).await;

        let mut mapping = SymbolMapping::new();
        let mut first_error = None;
        let mut succeeded = 0usize;

        for (url, result) in self.sources.iter().zip(results) {
            match result {
                Ok(master) => {
                    succeeded += 1;
                    merge_into(&mut mapping, master);
                }
                Err(e) if self.allow_partial => {
                    tracing::warn!(%url, error = %e, "symbol source failed, continuing without it");
                    first_error.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }

        if succeeded == 0 {
            return Err(first_error.unwrap_or_else(|| {
                PremiaError::Config("no symbol sources configured".into())
            }));
        }

        for entries in mapping.values_mut() {
            entries.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        }
        Ok(mapping)
    }

    async fn fetch_source(&self, url: &str) -> Result<HashMap<String, SymbolDetails>> {
        let source_err = |reason: String| PremiaError::SymbolSource {
            url: url.to_owned(),
            reason,
        };

        tracing::info!(%url, "fetching symbol master");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| source_err(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(source_err(format!("HTTP {status}")));
        }

        let bytes = resp.bytes().await.map_err(|e| source_err(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| source_err(e.to_string()))
    }
}

fn is_fresh(refreshed_at: SystemTime, now: SystemTime) -> bool {
    // A timestamp in the future counts as fresh.
    now.duration_since(refreshed_at)
        .map(|age| age < SYMBOL_CACHE_TTL)
        .unwrap_or(true)
}

fn merge_into(mapping: &mut SymbolMapping, master: HashMap<String, SymbolDetails>) {
    for (symbol, details) in master {
        let key = details.under_sym.trim().to_uppercase();
        if key.is_empty() {
            continue;
        }
        mapping
            .entry(key)
            .or_default()
            .push(SymbolEntry { symbol, details });
    }
}
