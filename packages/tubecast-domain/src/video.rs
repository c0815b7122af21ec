use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One catalog search hit as pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
	pub id: String,
	pub title: String,
	pub description: String,
	pub channel_title: String,
	pub channel_id: String,
	#[serde(rename = "thumbnail")]
	pub thumbnail_url: String,
	#[serde(with = "crate::time_serde")]
	pub published_at: OffsetDateTime,
}

/// The full current result list for a query. Never a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchUpdate {
	pub query: String,
	pub results: Vec<VideoSummary>,
}
