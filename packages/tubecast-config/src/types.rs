use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub upstream: Upstream,
	#[serde(default)]
	pub cache: Cache,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

/// YouTube Data API v3 settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Upstream {
	#[serde(default = "default_api_base")]
	pub api_base: String,
	pub api_key: String,
	#[serde(default = "default_upstream_max_results")]
	pub max_results: u32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Cache {
	/// Repeat queries inside this window are answered from the cache.
	pub freshness_window_secs: u64,
	/// Period of the background refresh pass while clients are connected.
	pub refresh_interval_secs: u64,
	/// Results kept per query after ranking.
	pub max_results: usize,
	/// Outbound updates buffered per connected client.
	pub subscriber_buffer: usize,
	/// Queries nobody asked for within this many seconds are dropped. `None` keeps them forever.
	pub idle_eviction_secs: Option<u64>,
}
impl Cache {
	pub fn freshness_window(&self) -> Duration {
		Duration::from_secs(self.freshness_window_secs)
	}

	pub fn refresh_interval(&self) -> Duration {
		Duration::from_secs(self.refresh_interval_secs)
	}

	pub fn idle_eviction(&self) -> Option<Duration> {
		self.idle_eviction_secs.map(Duration::from_secs)
	}
}
impl Default for Cache {
	fn default() -> Self {
		Self {
			freshness_window_secs: 600,
			refresh_interval_secs: 5,
			max_results: 10,
			subscriber_buffer: 64,
			idle_eviction_secs: None,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_api_base() -> String {
	"https://www.googleapis.com/youtube/v3".to_string()
}

fn default_upstream_max_results() -> u32 {
	10
}

fn default_timeout_ms() -> u64 {
	10_000
}
