use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub extraction: Extraction,
	#[serde(default)]
	pub journey: Journey,
	#[serde(default)]
	pub recall: Recall,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
	Memory,
	Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub backend: StorageBackend,
	pub postgres: Option<Postgres>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Limits applied while deriving tags and insights from a single note.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Extraction {
	pub max_insights: u32,
	pub insight_confidence: u8,
	pub max_technique_tags: u32,
}
impl Default for Extraction {
	fn default() -> Self {
		Self { max_insights: 5, insight_confidence: 85, max_technique_tags: 3 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Journey {
	/// Recency window, counted back from the synthesis moment, used to pick trending themes.
	pub trending_window_days: u32,
	pub max_trending_themes: u32,
	pub max_key_insights: u32,
	pub max_breakthroughs: u32,
	/// Strategies scoring above this are considered effective.
	pub effective_strategy_threshold: u8,
	/// Effective strategies used fewer times than this are recommended.
	pub underused_strategy_max_uses: u32,
	pub history_limit: u32,
}
impl Default for Journey {
	fn default() -> Self {
		Self {
			trending_window_days: 14,
			max_trending_themes: 5,
			max_key_insights: 10,
			max_breakthroughs: 3,
			effective_strategy_threshold: 70,
			underused_strategy_max_uses: 3,
			history_limit: 20,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Recall {
	pub cache_ttl_secs: u64,
	pub max_direct_matches: u32,
	pub max_related_insights: u32,
	pub max_timeline_dates: u32,
	pub excerpt_radius_chars: u32,
	/// Candidates whose normalized distance to the query exceeds this are dropped.
	pub max_fuzzy_distance: f32,
}
impl Default for Recall {
	fn default() -> Self {
		Self {
			cache_ttl_secs: 600,
			max_direct_matches: 10,
			max_related_insights: 5,
			max_timeline_dates: 10,
			excerpt_radius_chars: 50,
			max_fuzzy_distance: 0.6,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Security {
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: true }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}
