//! Retrying, caching decorator over any [`MarketDataPort`].

use crate::domain::error::StockscopeError;
use crate::domain::series::PriceSeries;
use crate::ports::data_port::{Interval, MarketDataPort, Period, SymbolInfo};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Linear backoff: after the n-th failed attempt, wait `retry_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        self.retry_delay.saturating_mul(failed_attempts)
    }

    /// Run `op` until it yields a non-empty value or attempts run out. The
    /// outcome of the last attempt is returned, empty or not.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, StockscopeError>,
        is_empty: impl Fn(&T) -> bool,
    ) -> Result<T, StockscopeError> {
        let mut attempt = 1;
        loop {
            let outcome = op();
            let done = match &outcome {
                Ok(value) if !is_empty(value) => true,
                Ok(_) => {
                    warn!(%label, attempt, "no data returned");
                    false
                }
                Err(e) => {
                    warn!(%label, attempt, error = %e, "fetch failed");
                    false
                }
            };
            if done || attempt >= self.max_attempts {
                return outcome;
            }
            let wait = self.backoff(attempt);
            debug!(%label, ?wait, "retrying");
            thread::sleep(wait);
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(2))
    }
}

/// Map with a fixed time-to-live per entry. Expired entries are dropped on
/// lookup. An entry whose deadline is past the clock's range never expires.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Option<Instant>, V)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let expired = match entries.get(key) {
            Some((Some(expires_at), value)) if Instant::now() < *expires_at => {
                return Some(value.clone());
            }
            Some((None, value)) => return Some(value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = Instant::now().checked_add(self.ttl);
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key, (expires_at, value));
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type SeriesKey = (String, Period, Interval);

pub struct CachedDataAdapter<P> {
    inner: P,
    retry: RetryPolicy,
    series: TtlCache<SeriesKey, PriceSeries>,
    symbols: TtlCache<(), Vec<String>>,
    info: TtlCache<String, SymbolInfo>,
}

impl<P: MarketDataPort> CachedDataAdapter<P> {
    pub fn new(inner: P, retry: RetryPolicy, ttl: Duration) -> Self {
        Self {
            inner,
            retry,
            series: TtlCache::new(ttl),
            symbols: TtlCache::new(ttl),
            info: TtlCache::new(ttl),
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.series.clear();
        self.symbols.clear();
        self.info.clear();
    }

    pub fn cached_series(&self) -> usize {
        self.series.len()
    }
}

impl<P: MarketDataPort> MarketDataPort for CachedDataAdapter<P> {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Option<PriceSeries>, StockscopeError> {
        let key = (symbol.to_string(), period, interval);
        if let Some(series) = self.series.get(&key) {
            debug!(%symbol, %period, %interval, "cache hit");
            return Ok(Some(series));
        }
        debug!(%symbol, %period, %interval, "cache miss");

        let fetched = self.retry.run(
            symbol,
            || self.inner.fetch_ohlcv(symbol, period, interval),
            |result| result.as_ref().is_none_or(PriceSeries::is_empty),
        )?;

        match fetched {
            Some(series) if !series.is_empty() => {
                self.series.insert(key, series.clone());
                Ok(Some(series))
            }
            _ => Ok(None),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockscopeError> {
        if let Some(symbols) = self.symbols.get(&()) {
            return Ok(symbols);
        }
        let symbols = self
            .retry
            .run("symbols", || self.inner.list_symbols(), |_| false)?;
        self.symbols.insert((), symbols.clone());
        Ok(symbols)
    }

    fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, StockscopeError> {
        let key = symbol.to_string();
        if let Some(info) = self.info.get(&key) {
            return Ok(info);
        }
        let info = self
            .retry
            .run(symbol, || self.inner.symbol_info(symbol), |_| false)?;
        self.info.insert(key, info.clone());
        Ok(info)
    }
}
