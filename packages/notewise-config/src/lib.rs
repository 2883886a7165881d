mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Extraction, Journey, Postgres, Recall, Security, Service, Storage, StorageBackend,
};

use std::{fs, path::Path};

pub const MAX_TRENDING_WINDOW_DAYS: u32 = 3_650;

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

	match cfg.storage.backend {
		StorageBackend::Postgres => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(Error::Validation {
					message: "storage.postgres is required when storage.backend is postgres."
						.to_string(),
				});
			};

			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
		},
		StorageBackend::Memory => {},
	}

	if cfg.extraction.max_insights == 0 {
		return Err(Error::Validation {
			message: "extraction.max_insights must be greater than zero.".to_string(),
		});
	}
	if cfg.extraction.insight_confidence > 100 {
		return Err(Error::Validation {
			message: "extraction.insight_confidence must be in the range 0-100.".to_string(),
		});
	}

	for (label, value) in [
		("journey.trending_window_days", cfg.journey.trending_window_days),
		("journey.max_trending_themes", cfg.journey.max_trending_themes),
		("journey.max_key_insights", cfg.journey.max_key_insights),
		("journey.max_breakthroughs", cfg.journey.max_breakthroughs),
		("journey.history_limit", cfg.journey.history_limit),
		("recall.max_direct_matches", cfg.recall.max_direct_matches),
		("recall.max_related_insights", cfg.recall.max_related_insights),
		("recall.max_timeline_dates", cfg.recall.max_timeline_dates),
	] {
		if value == 0 {
			return Err(Error::Validation { message: format!("{label} must be greater than zero.") });
		}
	}

	if cfg.journey.trending_window_days > MAX_TRENDING_WINDOW_DAYS {
		return Err(Error::Validation {
			message: format!(
				"journey.trending_window_days must be at most {MAX_TRENDING_WINDOW_DAYS}."
			),
		});
	}
	if cfg.journey.effective_strategy_threshold > 100 {
		return Err(Error::Validation {
			message: "journey.effective_strategy_threshold must be in the range 0-100."
				.to_string(),
		});
	}
	if !cfg.recall.max_fuzzy_distance.is_finite() {
		return Err(Error::Validation {
			message: "recall.max_fuzzy_distance must be a finite number.".to_string(),
		});
	}
	if cfg.recall.max_fuzzy_distance <= 0.0 || cfg.recall.max_fuzzy_distance > 1.0 {
		return Err(Error::Validation {
			message: "recall.max_fuzzy_distance must be greater than 0.0 and at most 1.0."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
	if let Some(postgres) = cfg.storage.postgres.as_mut() {
		postgres.dsn = postgres.dsn.trim().to_string();
	}
}
