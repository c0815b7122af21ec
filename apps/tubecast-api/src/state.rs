use std::sync::Arc;

use tubecast_providers::youtube::YouTubeClient;
use tubecast_service::{TubecastService, VideoCatalog, VideoSearch};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<TubecastService>,
}
impl AppState {
	pub fn new(config: &tubecast_config::Config) -> color_eyre::Result<Self> {
		let client = YouTubeClient::new(&config.upstream)?;

		Ok(Self::with_upstream(&config.cache, Arc::new(client)))
	}

	pub fn with_upstream<U>(cache: &tubecast_config::Cache, upstream: Arc<U>) -> Self
	where
		U: VideoSearch + VideoCatalog + 'static,
	{
		Self { service: Arc::new(TubecastService::new(cache, upstream)) }
	}
}
