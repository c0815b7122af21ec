use std::sync::Arc;

use tubecast_domain::{SearchUpdate, VideoSummary};

use crate::registry::ClientRegistry;

#[derive(Clone)]
pub struct BroadcastEngine {
	registry: Arc<ClientRegistry>,
}
impl BroadcastEngine {
	pub fn new(registry: Arc<ClientRegistry>) -> Self {
		Self { registry }
	}

	pub fn registry(&self) -> &Arc<ClientRegistry> {
		&self.registry
	}

	/// Sends one shared update to every current subscriber and returns how many accepted it.
	/// Closed subscribers are unregistered; failures never reach the caller.
	pub fn broadcast(&self, query: &str, results: Vec<VideoSummary>) -> usize {
		let update = Arc::new(SearchUpdate { query: query.to_string(), results });
		let mut delivered = 0;
		let mut closed = Vec::new();

		self.registry.for_each(|subscriber| match subscriber.deliver(update.clone()) {
			Ok(()) => delivered += 1,
			Err(err) => {
				tracing::warn!(query, subscriber = %subscriber.id(), error = %err, "Broadcast delivery failed.");

				if subscriber.is_closed() {
					closed.push(subscriber.id());
				}
			},
		});

		for id in closed {
			self.registry.unsubscribe(id);
		}

		tracing::debug!(query, delivered, results = update.results.len(), "Broadcast search update.");

		delivered
	}
}
