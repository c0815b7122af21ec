pub mod broadcast;
pub mod cache;
pub mod gateway;
pub mod registry;
pub mod scheduler;

mod error;

pub use error::{Error, Result};
pub use gateway::{QueryGateway, QueryOutcome};
pub use registry::{ClientRegistry, Subscriber, SubscriberId, UpdateReceiver};
pub use scheduler::{RefreshPass, RefreshScheduler, SchedulerState};

use std::{
	future::Future,
	pin::Pin,
	sync::{Arc, Weak},
};

use tubecast_config::Cache;
use tubecast_domain::{
	ChannelProfile, VideoDetails, VideoSummary,
	readability::{self, Readability},
	word_stats::{self, WordCount},
};
use tubecast_providers::youtube::YouTubeClient;

use crate::{broadcast::BroadcastEngine, cache::ResultCache};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Upstream catalog lookup. Timeouts and retries belong to the implementation.
pub trait VideoSearch
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, color_eyre::Result<Vec<VideoSummary>>>;
}

/// Direct catalog lookups that bypass the shared result cache.
pub trait VideoCatalog
where
	Self: Send + Sync,
{
	fn channel<'a>(&'a self, channel_id: &'a str) -> BoxFuture<'a, color_eyre::Result<ChannelProfile>>;

	fn videos_by_tag<'a>(&'a self, tag: &'a str) -> BoxFuture<'a, color_eyre::Result<Vec<VideoSummary>>>;

	fn video<'a>(&'a self, video_id: &'a str) -> BoxFuture<'a, color_eyre::Result<VideoDetails>>;

	/// Untruncated details of the videos a broad search for `query` returns.
	fn search_details<'a>(
		&'a self,
		query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<VideoDetails>>>;
}

impl VideoSearch for YouTubeClient {
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, color_eyre::Result<Vec<VideoSummary>>> {
		Box::pin(async move { Ok(YouTubeClient::search(self, query).await?) })
	}
}

impl VideoCatalog for YouTubeClient {
	fn channel<'a>(&'a self, channel_id: &'a str) -> BoxFuture<'a, color_eyre::Result<ChannelProfile>> {
		Box::pin(async move {
			let (channel, videos) =
				tokio::try_join!(YouTubeClient::channel(self, channel_id), self.channel_videos(channel_id))?;

			Ok(ChannelProfile { channel, videos })
		})
	}

	fn videos_by_tag<'a>(&'a self, tag: &'a str) -> BoxFuture<'a, color_eyre::Result<Vec<VideoSummary>>> {
		Box::pin(async move { Ok(YouTubeClient::videos_by_tag(self, tag).await?) })
	}

	fn video<'a>(&'a self, video_id: &'a str) -> BoxFuture<'a, color_eyre::Result<VideoDetails>> {
		Box::pin(async move { Ok(YouTubeClient::video(self, video_id).await?) })
	}

	fn search_details<'a>(
		&'a self,
		query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<VideoDetails>>> {
		Box::pin(async move { Ok(YouTubeClient::search_details(self, query).await?) })
	}
}

/// A registered client connection.
pub struct Connection {
	pub id: SubscriberId,
	pub updates: UpdateReceiver,
}

pub struct TubecastService {
	cache: Arc<ResultCache>,
	gateway: Arc<QueryGateway>,
	catalog: Arc<dyn VideoCatalog>,
	subscriber_buffer: usize,
}
impl TubecastService {
	pub fn new<U>(cfg: &Cache, upstream: Arc<U>) -> Self
	where
		U: VideoSearch + VideoCatalog + 'static,
	{
		let catalog: Arc<dyn VideoCatalog> = upstream.clone();

		Self::with_upstreams(cfg, upstream, catalog)
	}

	pub fn with_upstreams(
		cfg: &Cache,
		upstream: Arc<dyn VideoSearch>,
		catalog: Arc<dyn VideoCatalog>,
	) -> Self {
		let cache = Arc::new(ResultCache::from_config(cfg));
		// The registry holds the scheduler, whose ticks call back into the gateway; the weak
		// handle keeps that loop from owning the gateway.
		let gateway = Arc::new_cyclic(|gateway: &Weak<QueryGateway>| {
			let pass: Weak<dyn RefreshPass> = gateway.clone();
			let scheduler = RefreshScheduler::new(cfg.refresh_interval(), pass);
			let registry = Arc::new(ClientRegistry::new(scheduler));

			QueryGateway::new(
				cache.clone(),
				upstream.clone(),
				BroadcastEngine::new(registry),
				cfg.idle_eviction(),
			)
		});

		Self { cache, gateway, catalog, subscriber_buffer: cfg.subscriber_buffer }
	}

	pub fn cache(&self) -> &ResultCache {
		&self.cache
	}

	pub fn registry(&self) -> &ClientRegistry {
		self.gateway.broadcaster().registry()
	}

	pub fn scheduler_state(&self) -> SchedulerState {
		self.registry().scheduler_state()
	}

	/// Registers a new client. Must be called from inside a tokio runtime.
	pub fn connect(&self) -> Connection {
		let (subscriber, updates) = Subscriber::channel(self.subscriber_buffer);
		let id = subscriber.id();

		self.registry().subscribe(subscriber);

		Connection { id, updates }
	}

	pub fn disconnect(&self, id: SubscriberId) -> bool {
		self.registry().unsubscribe(id)
	}

	pub fn handle_query(&self, query: &str) -> Result<QueryOutcome> {
		self.gateway.handle(query)
	}

	/// Word frequencies over the full titles and descriptions of the videos matching `query`.
	pub async fn word_stats(&self, query: &str) -> Result<Vec<WordCount>> {
		if query.trim().is_empty() {
			return Err(Error::empty_query());
		}

		let videos = self.catalog.search_details(query).await.map_err(|err| {
			tracing::error!(query, error = %err, "Upstream fetch for word statistics failed.");

			Error::from(err)
		})?;

		Ok(word_stats::count_words(
			videos.iter().map(|video| format!("{} {}", video.title, video.description)),
		))
	}

	pub async fn channel_profile(&self, channel_id: &str) -> Result<ChannelProfile> {
		if channel_id.trim().is_empty() {
			return Err(Error::blank("Channel id"));
		}

		self.catalog.channel(channel_id).await.map_err(|err| lookup_failed("channel", channel_id, err))
	}

	pub async fn videos_by_tag(&self, tag: &str) -> Result<Vec<VideoSummary>> {
		if tag.trim().is_empty() {
			return Err(Error::blank("Tag"));
		}

		self.catalog.videos_by_tag(tag).await.map_err(|err| lookup_failed("tag", tag, err))
	}

	/// The video's details; `tags` is empty when the uploader set none.
	pub async fn video_tags(&self, video_id: &str) -> Result<VideoDetails> {
		if video_id.trim().is_empty() {
			return Err(Error::blank("Video id"));
		}

		self.catalog.video(video_id).await.map_err(|err| lookup_failed("video", video_id, err))
	}

	pub fn readability<S>(&self, descriptions: &[S]) -> Vec<Readability>
	where
		S: AsRef<str>,
	{
		readability::score_all(descriptions)
	}
}

fn lookup_failed(kind: &str, key: &str, err: color_eyre::Report) -> Error {
	let err = Error::from(err);

	match &err {
		Error::NotFound { .. } => tracing::debug!(kind, key, error = %err, "Catalog lookup found nothing."),
		_ => tracing::error!(kind, key, error = %err, "Catalog lookup failed."),
	}

	err
}
