use std::{
	collections::HashMap,
	sync::{Arc, Mutex, RwLock},
	time::Duration,
};

use tokio::time::Instant;

use tubecast_domain::{VideoSummary, ranking};

#[derive(Debug)]
pub struct CacheEntry {
	pub query: String,
	/// Newest first, deduplicated by id, capped at the cache's `max_results`.
	pub results: Vec<VideoSummary>,
	pub last_fetched_at: Option<Instant>,
	pub last_requested_at: Instant,
	pub in_flight: bool,
}
impl CacheEntry {
	fn new(query: &str, now: Instant) -> Self {
		Self {
			query: query.to_string(),
			results: Vec::new(),
			last_fetched_at: None,
			last_requested_at: now,
			in_flight: false,
		}
	}

	fn is_fresh(&self, now: Instant, window: Duration) -> bool {
		self.last_fetched_at.map(|at| now.saturating_duration_since(at) < window).unwrap_or(false)
	}
}

/// What a client query should do after consulting the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
	/// Fetched inside the freshness window; serve the snapshot.
	Fresh(Vec<VideoSummary>),
	/// Another fetch is outstanding and will broadcast when it lands.
	InFlight(Vec<VideoSummary>),
	/// The caller now owns the fetch; `last_fetched_at` is already stamped.
	Fetch,
}

pub struct ResultCache {
	entries: RwLock<HashMap<String, Arc<Mutex<CacheEntry>>>>,
	freshness_window: Duration,
	max_results: usize,
}
impl ResultCache {
	pub fn new(freshness_window: Duration, max_results: usize) -> Self {
		Self { entries: RwLock::new(HashMap::new()), freshness_window, max_results }
	}

	pub fn from_config(cfg: &tubecast_config::Cache) -> Self {
		Self::new(cfg.freshness_window(), cfg.max_results)
	}

	pub fn recency(&self, query: &str) -> Option<Instant> {
		let entry = self.entry(query)?;

		lock(&entry).last_fetched_at
	}

	pub fn is_fresh(&self, query: &str) -> bool {
		self.entry(query)
			.map(|entry| lock(&entry).is_fresh(Instant::now(), self.freshness_window))
			.unwrap_or(false)
	}

	/// Returns `true` when the entry was created by this call.
	pub fn ensure_tracked(&self, query: &str) -> bool {
		self.entry_or_insert(query).1
	}

	/// Recency check and optimistic stamp in one step, so identical queries racing each other
	/// produce a single fetch.
	pub fn claim_query(&self, query: &str) -> Claim {
		let (entry, _) = self.entry_or_insert(query);
		let mut entry = lock(&entry);
		let now = Instant::now();

		entry.last_requested_at = now;

		if entry.is_fresh(now, self.freshness_window) {
			return Claim::Fresh(entry.results.clone());
		}
		if entry.in_flight {
			return Claim::InFlight(entry.results.clone());
		}

		entry.last_fetched_at = Some(now);
		entry.in_flight = true;

		Claim::Fetch
	}

	/// Claims a periodic refresh regardless of freshness. Returns `false` for untracked queries
	/// and for queries that already have a fetch outstanding.
	pub fn claim_refresh(&self, query: &str) -> bool {
		let Some(entry) = self.entry(query) else {
			return false;
		};
		let mut entry = lock(&entry);

		if entry.in_flight {
			return false;
		}

		entry.last_fetched_at = Some(Instant::now());
		entry.in_flight = true;

		true
	}

	/// Ends an unsuccessful fetch without touching the cached results.
	pub fn release(&self, query: &str) {
		if let Some(entry) = self.entry(query) {
			lock(&entry).in_flight = false;
		}
	}

	pub fn merge(&self, query: &str, items: Vec<VideoSummary>) -> Vec<VideoSummary> {
		let (entry, _) = self.entry_or_insert(query);
		let mut entry = lock(&entry);
		let appended = ranking::merge_ranked(&mut entry.results, items, self.max_results);

		entry.last_fetched_at = Some(Instant::now());
		entry.in_flight = false;

		tracing::debug!(query, appended, total = entry.results.len(), "Merged search results.");

		entry.results.clone()
	}

	pub fn snapshot(&self, query: &str) -> Option<Vec<VideoSummary>> {
		let entry = self.entry(query)?;

		Some(lock(&entry).results.clone())
	}

	pub fn queries(&self) -> Vec<String> {
		read(&self.entries).keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		read(&self.entries).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drops entries nobody requested within `idle_for`. Entries with a fetch outstanding stay,
	/// as do entries another caller still holds between lookup and lock.
	pub fn evict_idle(&self, idle_for: Duration) -> Vec<String> {
		let now = Instant::now();
		let mut entries = write(&self.entries);
		let mut evicted = Vec::new();

		entries.retain(|query, entry| {
			if Arc::strong_count(entry) > 1 {
				return true;
			}

			let entry = lock(entry);
			let idle = now.saturating_duration_since(entry.last_requested_at) >= idle_for;

			if idle && !entry.in_flight {
				evicted.push(query.clone());

				return false;
			}

			true
		});

		evicted
	}

	fn entry(&self, query: &str) -> Option<Arc<Mutex<CacheEntry>>> {
		read(&self.entries).get(query).cloned()
	}

	fn entry_or_insert(&self, query: &str) -> (Arc<Mutex<CacheEntry>>, bool) {
		if let Some(entry) = self.entry(query) {
			return (entry, false);
		}

		let mut entries = write(&self.entries);

		if let Some(entry) = entries.get(query) {
			return (entry.clone(), false);
		}

		let entry = Arc::new(Mutex::new(CacheEntry::new(query, Instant::now())));

		entries.insert(query.to_string(), entry.clone());

		(entry, true)
	}
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

fn read<T>(rw: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
	rw.read().unwrap_or_else(|err| err.into_inner())
}

fn write<T>(rw: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
	rw.write().unwrap_or_else(|err| err.into_inner())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn claim_stamps_before_the_fetch_lands() {
		let cache = ResultCache::new(Duration::from_secs(600), 10);

		assert_eq!(cache.claim_query("akka"), Claim::Fetch);
		assert!(cache.recency("akka").is_some());
		assert_eq!(cache.claim_query("akka"), Claim::Fresh(Vec::new()));
	}

	#[tokio::test(start_paused = true)]
	async fn stale_in_flight_query_is_not_claimed_twice() {
		let cache = ResultCache::new(Duration::from_secs(1), 10);

		assert_eq!(cache.claim_query("akka"), Claim::Fetch);

		tokio::time::advance(Duration::from_secs(2)).await;

		assert_eq!(cache.claim_query("akka"), Claim::InFlight(Vec::new()));
		assert!(!cache.claim_refresh("akka"));

		cache.release("akka");

		assert!(cache.claim_refresh("akka"));
	}

	#[tokio::test(start_paused = true)]
	async fn evicts_only_idle_settled_entries() {
		let cache = ResultCache::new(Duration::from_secs(600), 10);

		cache.ensure_tracked("old");
		cache.ensure_tracked("busy");
		cache.claim_refresh("busy");

		tokio::time::advance(Duration::from_secs(120)).await;

		cache.ensure_tracked("new");

		let evicted = cache.evict_idle(Duration::from_secs(60));

		assert_eq!(evicted, ["old"]);
		assert_eq!(cache.len(), 2);
		assert!(cache.snapshot("busy").is_some());
		assert!(cache.snapshot("new").is_some());
	}

	#[tokio::test(start_paused = true)]
	async fn entry_held_by_a_claim_survives_eviction() {
		let cache = ResultCache::new(Duration::from_secs(600), 10);

		cache.ensure_tracked("akka");

		tokio::time::advance(Duration::from_secs(120)).await;

		// A claim that looked the entry up but has not locked it yet.
		let held = cache.entry("akka").expect("Entry must exist.");

		assert!(cache.evict_idle(Duration::from_secs(60)).is_empty());

		drop(held);

		assert_eq!(cache.claim_query("akka"), Claim::Fetch);

		cache.release("akka");

		assert!(cache.claim_refresh("akka"), "Released entry must still be tracked.");

		cache.release("akka");
		tokio::time::advance(Duration::from_secs(120)).await;

		assert_eq!(cache.evict_idle(Duration::from_secs(60)), ["akka"]);
	}
}
