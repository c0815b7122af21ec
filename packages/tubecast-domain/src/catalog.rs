use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::VideoSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
	pub id: String,
	pub title: String,
	pub description: String,
	#[serde(rename = "thumbnail")]
	pub thumbnail_url: String,
	/// Absent when the channel hides it.
	pub subscriber_count: Option<u64>,
	pub video_count: Option<u64>,
	pub view_count: Option<u64>,
}

/// A channel together with its newest uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelProfile {
	pub channel: ChannelInfo,
	pub videos: Vec<VideoSummary>,
}

/// Full snippet of one video, as returned by `videos.list`. Unlike search hits, the description
/// is not truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
	pub id: String,
	pub title: String,
	pub description: String,
	pub channel_title: String,
	pub channel_id: String,
	#[serde(with = "crate::time_serde")]
	pub published_at: OffsetDateTime,
	pub tags: Vec<String>,
	/// ISO 8601 duration such as `PT4M13S`.
	pub duration: Option<String>,
}
