mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Cache, Config, Service, Upstream};

use std::{fs, path::Path};

pub const MAX_UPSTREAM_RESULTS: u32 = 50;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.upstream.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "upstream.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.upstream.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "upstream.api_key must be non-empty.".to_string(),
		});
	}
	if !(1..=MAX_UPSTREAM_RESULTS).contains(&cfg.upstream.max_results) {
		return Err(Error::Validation {
			message: format!("upstream.max_results must be in the range 1-{MAX_UPSTREAM_RESULTS}."),
		});
	}
	if cfg.upstream.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "upstream.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.upstream.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("upstream.default_headers.{key} must be a string."),
			});
		}
	}

	for (label, value) in [
		("cache.freshness_window_secs", cfg.cache.freshness_window_secs),
		("cache.refresh_interval_secs", cfg.cache.refresh_interval_secs),
		("cache.max_results", cfg.cache.max_results as u64),
		("cache.subscriber_buffer", cfg.cache.subscriber_buffer as u64),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if let Some(idle) = cfg.cache.idle_eviction_secs
		&& idle == 0
	{
		return Err(Error::Validation {
			message: "cache.idle_eviction_secs must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let api_base = cfg.upstream.api_base.trim().trim_end_matches('/').to_string();

	cfg.upstream.api_base = api_base;
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
}
