use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use tubecast_config::{MAX_UPSTREAM_RESULTS, Upstream};
use tubecast_domain::{ChannelInfo, VideoDetails, VideoSummary, time_serde};

use crate::{Error, Result};

const SEARCH_PATH: &str = "/search";
const CHANNELS_PATH: &str = "/channels";
const VIDEOS_PATH: &str = "/videos";
const CHANNEL_VIDEOS: u32 = 10;
const TAG_VIDEOS: u32 = 10;

/// Client for the YouTube Data API v3 `search`, `channels` and `videos` endpoints.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
	client: Client,
	cfg: Upstream,
}
impl YouTubeClient {
	pub fn new(cfg: &Upstream) -> Result<Self> {
		if cfg.api_key.trim().is_empty() {
			return Err(Error::InvalidConfig {
				message: "YouTube api_key must be non-empty.".to_string(),
			});
		}

		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(crate::default_headers(&cfg.default_headers)?)
			.build()?;

		Ok(Self { client, cfg: cfg.clone() })
	}

	pub fn endpoint(&self, path: &str) -> String {
		format!("{}{path}", self.cfg.api_base)
	}

	/// Newest uploads matching `query`, up to the configured `max_results`.
	pub async fn search(&self, query: &str) -> Result<Vec<VideoSummary>> {
		self.search_with_limit(query, self.cfg.max_results).await
	}

	pub async fn search_with_limit(&self, query: &str, max_results: u32) -> Result<Vec<VideoSummary>> {
		let videos = self.search_videos(&[("q", query), ("order", "date")], max_results).await?;

		tracing::debug!(query, count = videos.len(), "YouTube search completed.");

		Ok(videos)
	}

	/// Relevance-ordered videos for a tag.
	pub async fn videos_by_tag(&self, tag: &str) -> Result<Vec<VideoSummary>> {
		self.search_videos(&[("q", tag)], TAG_VIDEOS).await
	}

	pub async fn channel_videos(&self, channel_id: &str) -> Result<Vec<VideoSummary>> {
		self.search_videos(&[("channelId", channel_id), ("order", "date")], CHANNEL_VIDEOS).await
	}

	pub async fn channel(&self, channel_id: &str) -> Result<ChannelInfo> {
		let json =
			self.get_json(CHANNELS_PATH, &[("part", "snippet,statistics"), ("id", channel_id)]).await?;

		parse_channel_response(json, channel_id)
	}

	/// Full details for the given ids, in the order upstream returns them. Unknown ids are
	/// silently absent.
	pub async fn videos(&self, ids: &[&str]) -> Result<Vec<VideoDetails>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let ids = ids.join(",");
		let json =
			self.get_json(VIDEOS_PATH, &[("part", "snippet,contentDetails"), ("id", ids.as_str())]).await?;

		parse_videos_response(json)
	}

	pub async fn video(&self, video_id: &str) -> Result<VideoDetails> {
		self.videos(&[video_id]).await?.into_iter().next().ok_or_else(|| Error::NotFound {
			message: format!("Video {video_id} not found."),
		})
	}

	/// Untruncated details for up to 50 videos matching `query`.
	pub async fn search_details(&self, query: &str) -> Result<Vec<VideoDetails>> {
		let hits = self.search_videos(&[("q", query)], MAX_UPSTREAM_RESULTS).await?;
		let ids: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();
		let details = self.videos(&ids).await?;

		tracing::debug!(query, hits = hits.len(), details = details.len(), "Fetched video details.");

		Ok(details)
	}

	async fn search_videos(
		&self,
		params: &[(&str, &str)],
		max_results: u32,
	) -> Result<Vec<VideoSummary>> {
		let max_results = max_results.to_string();
		let mut query = vec![("part", "snippet"), ("type", "video"), ("maxResults", max_results.as_str())];

		query.extend_from_slice(params);

		parse_search_response(self.get_json(SEARCH_PATH, &query).await?)
	}

	async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
		let body = self
			.client
			.get(self.endpoint(path))
			.query(params)
			.query(&[("key", self.cfg.api_key.as_str())])
			.send()
			.await?
			.error_for_status()?
			.text()
			.await?;

		Ok(serde_json::from_str(&body)?)
	}
}

pub fn parse_search_response(json: Value) -> Result<Vec<VideoSummary>> {
	let items = items(&json, "Search")?;
	let mut videos = Vec::with_capacity(items.len());

	for item in items {
		// Channel and playlist hits carry no videoId.
		let Some(id) = item.pointer("/id/videoId").and_then(Value::as_str) else {
			continue;
		};
		let snippet = snippet(item, id)?;

		videos.push(VideoSummary {
			id: id.to_string(),
			title: str_field(snippet, "/title").to_string(),
			description: str_field(snippet, "/description").to_string(),
			channel_title: str_field(snippet, "/channelTitle").to_string(),
			channel_id: str_field(snippet, "/channelId").to_string(),
			thumbnail_url: str_field(snippet, "/thumbnails/default/url").to_string(),
			published_at: published_at(snippet, id)?,
		});
	}

	Ok(videos)
}

pub fn parse_channel_response(json: Value, channel_id: &str) -> Result<ChannelInfo> {
	let Some(item) = items(&json, "Channel")?.first() else {
		return Err(Error::NotFound { message: format!("Channel {channel_id} not found.") });
	};
	let id = item.get("id").and_then(Value::as_str).unwrap_or(channel_id);
	let snippet = snippet(item, id)?;

	Ok(ChannelInfo {
		id: id.to_string(),
		title: str_field(snippet, "/title").to_string(),
		description: str_field(snippet, "/description").to_string(),
		thumbnail_url: str_field(snippet, "/thumbnails/default/url").to_string(),
		subscriber_count: count_field(item, "/statistics/subscriberCount"),
		video_count: count_field(item, "/statistics/videoCount"),
		view_count: count_field(item, "/statistics/viewCount"),
	})
}

pub fn parse_videos_response(json: Value) -> Result<Vec<VideoDetails>> {
	let items = items(&json, "Videos")?;
	let mut videos = Vec::with_capacity(items.len());

	for item in items {
		let id = item.get("id").and_then(Value::as_str).ok_or_else(|| Error::InvalidResponse {
			message: "Video item is missing id.".to_string(),
		})?;
		let snippet = snippet(item, id)?;
		let tags = snippet
			.get("tags")
			.and_then(Value::as_array)
			.map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
			.unwrap_or_default();

		videos.push(VideoDetails {
			id: id.to_string(),
			title: str_field(snippet, "/title").to_string(),
			description: str_field(snippet, "/description").to_string(),
			channel_title: str_field(snippet, "/channelTitle").to_string(),
			channel_id: str_field(snippet, "/channelId").to_string(),
			published_at: published_at(snippet, id)?,
			tags,
			duration: item
				.pointer("/contentDetails/duration")
				.and_then(Value::as_str)
				.map(str::to_string),
		});
	}

	Ok(videos)
}

fn items<'a>(json: &'a Value, kind: &str) -> Result<&'a Vec<Value>> {
	json.get("items").and_then(Value::as_array).ok_or_else(|| Error::InvalidResponse {
		message: format!("{kind} response is missing items array."),
	})
}

fn snippet<'a>(item: &'a Value, id: &str) -> Result<&'a Value> {
	item.get("snippet").ok_or_else(|| Error::InvalidResponse {
		message: format!("Item {id} is missing snippet."),
	})
}

fn published_at(snippet: &Value, id: &str) -> Result<time::OffsetDateTime> {
	let raw = str_field(snippet, "/publishedAt");

	time_serde::parse(raw).map_err(|err| Error::InvalidResponse {
		message: format!("Item {id} has invalid publishedAt {raw:?}: {err}"),
	})
}

fn str_field<'a>(value: &'a Value, pointer: &str) -> &'a str {
	value.pointer(pointer).and_then(Value::as_str).unwrap_or_default()
}

// Statistics arrive as decimal strings.
fn count_field(value: &Value, pointer: &str) -> Option<u64> {
	value.pointer(pointer).and_then(Value::as_str).and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn skips_items_without_video_id() {
		let json = serde_json::json!({
			"items": [
				{ "id": { "kind": "youtube#channel", "channelId": "UCx" }, "snippet": {} },
				{
					"id": { "kind": "youtube#video", "videoId": "abc" },
					"snippet": {
						"publishedAt": "2024-01-03T10:00:00Z",
						"title": "Akka in action",
						"description": "Actors",
						"channelTitle": "Lightbend",
						"channelId": "UCl",
						"thumbnails": { "default": { "url": "https://i.ytimg.com/vi/abc/default.jpg" } }
					}
				}
			]
		});
		let videos = parse_search_response(json).expect("parse failed");

		assert_eq!(videos.len(), 1);
		assert_eq!(videos[0].id, "abc");
		assert_eq!(videos[0].channel_title, "Lightbend");
		assert_eq!(videos[0].thumbnail_url, "https://i.ytimg.com/vi/abc/default.jpg");
	}

	#[test]
	fn rejects_unparseable_published_at() {
		let json = serde_json::json!({
			"items": [{ "id": { "videoId": "abc" }, "snippet": { "publishedAt": "yesterday" } }]
		});
		let err = parse_search_response(json).expect_err("Expected invalid response.");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}

	#[test]
	fn hidden_statistics_stay_absent() {
		let json = serde_json::json!({
			"items": [{
				"id": "UCl",
				"snippet": { "title": "Lightbend" },
				"statistics": { "hiddenSubscriberCount": true, "videoCount": "12", "viewCount": "n/a" }
			}]
		});
		let channel = parse_channel_response(json, "UCl").expect("parse failed");

		assert_eq!(channel.subscriber_count, None);
		assert_eq!(channel.video_count, Some(12));
		assert_eq!(channel.view_count, None);
	}
}
