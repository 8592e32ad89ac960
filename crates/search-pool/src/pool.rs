use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use discovery_common::SearchCredentialConfig;

/// A usable credential handed out to a caller. Carries everything needed
/// to issue one search call; the caller reports the outcome back via
/// `record_usage` / `mark_exhausted`.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: String,
    pub api_key: String,
    pub engine_id: String,
}

struct CredentialState {
    id: String,
    name: String,
    api_key: String,
    engine_id: String,
    daily_quota: u32,
    used_today: AtomicU32,
    exhausted: AtomicBool,
    last_reset: Mutex<NaiveDate>,
}

impl CredentialState {
    fn maybe_reset(&self) {
        let today = Utc::now().date_naive();
        let mut last = self.last_reset.lock().unwrap();
        if *last != today {
            self.used_today.store(0, Ordering::Relaxed);
            self.exhausted.store(false, Ordering::Relaxed);
            *last = today;
        }
    }

    fn remaining(&self) -> u32 {
        self.daily_quota
            .saturating_sub(self.used_today.load(Ordering::Relaxed))
    }

    fn is_usable(&self) -> bool {
        !self.exhausted.load(Ordering::Relaxed) && self.remaining() > 0
    }
}

/// Per-credential usage breakdown, for operator-facing stats.
#[derive(Debug, Clone)]
pub struct CredentialUsage {
    pub id: String,
    pub name: String,
    pub used_today: u32,
    pub daily_quota: u32,
    pub exhausted: bool,
}

/// Aggregate pool stats.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub total_used_today: u32,
    pub total_available_today: u32,
    pub active_credentials: u32,
    pub queries_remaining: u32,
    pub mode: &'static str,
    /// Estimated cost in cents; all queries here are against each
    /// provider's free daily quota, so this is always 0.
    pub estimated_cost: u64,
}

/// Credential pool with daily per-credential quota and 429 handling
/// Day rollover is lazy: checked on every access rather than
/// via a background timer.
pub struct SearchEnginePool {
    credentials: Vec<CredentialState>,
}

impl SearchEnginePool {
    pub fn new(configs: Vec<SearchCredentialConfig>, daily_quota: u32) -> Self {
        let today = Utc::now().date_naive();
        let credentials = configs
            .into_iter()
            .enumerate()
            .map(|(i, c)| CredentialState {
                id: format!("cred-{i}"),
                name: c.name,
                api_key: c.api_key,
                engine_id: c.engine_id,
                daily_quota,
                used_today: AtomicU32::new(0),
                exhausted: AtomicBool::new(false),
                last_reset: Mutex::new(today),
            })
            .collect();
        Self { credentials }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.iter().any(|c| {
            c.maybe_reset();
            c.is_usable()
        })
    }

    /// Return the credential with the most remaining quota that is not
    /// exhausted. Ties broken by original (stable) ordering.
    pub fn get_available_credential(&self) -> Option<Credential> {
        let mut best: Option<&CredentialState> = None;
        for c in &self.credentials {
            c.maybe_reset();
            if !c.is_usable() {
                continue;
            }
            match best {
                None => best = Some(c),
                Some(b) if c.remaining() > b.remaining() => best = Some(c),
                _ => {}
            }
        }
        best.map(|c| Credential {
            id: c.id.clone(),
            api_key: c.api_key.clone(),
            engine_id: c.engine_id.clone(),
        })
    }

    /// Atomically increment usage for `id`; marks exhausted once the
    /// credential reaches its daily quota.
    pub fn record_usage(&self, id: &str) {
        if let Some(c) = self.credentials.iter().find(|c| c.id == id) {
            c.maybe_reset();
            let used = c.used_today.fetch_add(1, Ordering::Relaxed) + 1;
            if used >= c.daily_quota {
                c.exhausted.store(true, Ordering::Relaxed);
            }
        }
    }

    /// Immediately mark a credential exhausted (e.g. on a 429 response),
    /// independent of its recorded usage count.
    pub fn mark_exhausted(&self, id: &str) {
        if let Some(c) = self.credentials.iter().find(|c| c.id == id) {
            c.exhausted.store(true, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> PoolStats {
        let mut total_used = 0u32;
        let mut total_available = 0u32;
        let mut active = 0u32;
        for c in &self.credentials {
            c.maybe_reset();
            total_used += c.used_today.load(Ordering::Relaxed);
            total_available += c.daily_quota;
            if c.is_usable() {
                active += 1;
            }
        }
        PoolStats {
            total_used_today: total_used,
            total_available_today: total_available,
            active_credentials: active,
            queries_remaining: total_available.saturating_sub(total_used),
            mode: "free-tier",
            estimated_cost: 0,
        }
    }

    pub fn get_detailed_usage(&self) -> Vec<CredentialUsage> {
        self.credentials
            .iter()
            .map(|c| {
                c.maybe_reset();
                CredentialUsage {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    used_today: c.used_today.load(Ordering::Relaxed),
                    daily_quota: c.daily_quota,
                    exhausted: c.exhausted.load(Ordering::Relaxed),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cred(name: &str) -> SearchCredentialConfig {
        SearchCredentialConfig {
            name: name.to_string(),
            api_key: format!("{name}-key"),
            engine_id: format!("{name}-engine"),
        }
    }

    #[test]
    fn picks_credential_with_most_remaining_quota() {
        let pool = SearchEnginePool::new(vec![cred("a"), cred("b")], 100);
        pool.record_usage("cred-0");
        pool.record_usage("cred-0");
        let c = pool.get_available_credential().unwrap();
        assert_eq!(c.id, "cred-1");
    }

    #[test]
    fn exhausts_after_quota_reached() {
        let pool = SearchEnginePool::new(vec![cred("a")], 2);
        pool.record_usage("cred-0");
        pool.record_usage("cred-0");
        assert!(!pool.has_credentials());
        assert!(pool.get_available_credential().is_none());
    }

    #[test]
    fn mark_exhausted_overrides_remaining_quota() {
        let pool = SearchEnginePool::new(vec![cred("a")], 100);
        pool.mark_exhausted("cred-0");
        assert!(pool.get_available_credential().is_none());
    }

    #[test]
    fn rotates_to_second_credential_on_429() {
        let pool = SearchEnginePool::new(vec![cred("a"), cred("b")], 100);
        let first = pool.get_available_credential().unwrap();
        assert_eq!(first.id, "cred-0");
        pool.mark_exhausted(&first.id);
        let second = pool.get_available_credential().unwrap();
        assert_eq!(second.id, "cred-1");
    }

    #[test]
    fn sum_of_quotas_exhausts_whole_pool() {
        let pool = SearchEnginePool::new(vec![cred("a"), cred("b")], 10);
        for _ in 0..20 {
            let c = pool.get_available_credential().expect("should have credential");
            pool.record_usage(&c.id);
        }
        assert!(pool.get_available_credential().is_none());
        assert_eq!(pool.get_stats().queries_remaining, 0);
    }
}
