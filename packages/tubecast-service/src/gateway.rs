use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;

use crate::{
	Error, Result, VideoSearch,
	broadcast::BroadcastEngine,
	cache::{Claim, ResultCache},
	scheduler::RefreshPass,
};

#[derive(Debug)]
pub enum QueryOutcome {
	/// Served from the cache; carries how many subscribers received the snapshot.
	Cached { delivered: usize },
	/// An upstream fetch was started; it merges and broadcasts when it completes.
	Refreshing(JoinHandle<()>),
}

/// Fetch, merge, broadcast. Runs outside every lock except the brief merge.
#[derive(Clone)]
pub(crate) struct FetchCycle {
	cache: Arc<ResultCache>,
	upstream: Arc<dyn VideoSearch>,
	broadcaster: BroadcastEngine,
}
impl FetchCycle {
	pub(crate) async fn run(&self, query: &str) -> Result<usize> {
		match self.upstream.search(query).await {
			Ok(items) => {
				let fetched = items.len();
				let results = self.cache.merge(query, items);

				tracing::info!(query, fetched, cached = results.len(), "Refreshed query.");

				Ok(self.broadcaster.broadcast(query, results))
			},
			Err(err) => {
				self.cache.release(query);

				let err = Error::from(err);

				tracing::error!(query, error = %err, "Upstream fetch failed, keeping cached results.");

				Err(err)
			},
		}
	}

	pub(crate) fn spawn(&self, query: String) -> JoinHandle<()> {
		let cycle = self.clone();

		tokio::spawn(async move {
			let _ = cycle.run(&query).await;
		})
	}
}

pub struct QueryGateway {
	cache: Arc<ResultCache>,
	cycle: FetchCycle,
	idle_eviction: Option<Duration>,
}
impl QueryGateway {
	pub fn new(
		cache: Arc<ResultCache>,
		upstream: Arc<dyn VideoSearch>,
		broadcaster: BroadcastEngine,
		idle_eviction: Option<Duration>,
	) -> Self {
		let cycle = FetchCycle { cache: cache.clone(), upstream, broadcaster };

		Self { cache, cycle, idle_eviction }
	}

	pub fn broadcaster(&self) -> &BroadcastEngine {
		&self.cycle.broadcaster
	}

	/// Entry point for a client-issued query.
	pub fn handle(&self, query: &str) -> Result<QueryOutcome> {
		if query.trim().is_empty() {
			return Err(Error::empty_query());
		}

		match self.cache.claim_query(query) {
			Claim::Fresh(results) => {
				tracing::debug!(query, "Serving cached results.");

				Ok(QueryOutcome::Cached { delivered: self.broadcaster().broadcast(query, results) })
			},
			Claim::InFlight(results) => {
				tracing::debug!(query, "Fetch already in flight, serving current results.");

				Ok(QueryOutcome::Cached { delivered: self.broadcaster().broadcast(query, results) })
			},
			Claim::Fetch => {
				tracing::info!(query, "Fetching query from upstream.");

				Ok(QueryOutcome::Refreshing(self.cycle.spawn(query.to_string())))
			},
		}
	}
}
impl RefreshPass for QueryGateway {
	fn run_pass(&self) {
		if let Some(idle_for) = self.idle_eviction {
			let evicted = self.cache.evict_idle(idle_for);

			if !evicted.is_empty() {
				tracing::info!(count = evicted.len(), "Evicted idle queries.");
			}
		}

		let mut started = 0;

		for query in self.cache.queries() {
			if !self.cache.claim_refresh(&query) {
				tracing::debug!(query = query.as_str(), "Skipping query with a fetch in flight.");

				continue;
			}

			self.cycle.spawn(query);

			started += 1;
		}

		tracing::debug!(started, "Refresh tick dispatched.");
	}
}
