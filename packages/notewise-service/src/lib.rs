pub mod cache;
pub mod journey;
pub mod notes;
pub mod recall;
pub mod tagging;
pub mod time_serde;

mod error;

pub use cache::RecallCache;
pub use error::{Error, Result};
pub use journey::{
	CopingStrategies, DominantThemes, EmotionPoint, JourneyHistoryRequest, JourneySynthesis,
	ProgressIndicators, SynthesizeRequest, TimeRange,
};
pub use notes::{AddNoteRequest, AddNoteResponse};
pub use recall::{DirectMatch, RecallPatterns, RecallRequest, RecallResult, SourceKind};
pub use tagging::{TagReport, TagRequest};

use std::{sync::Arc, time::Duration};

use notewise_config::Config;
use notewise_domain::fuzzy::{SimilarityScorer, SubstringLevenshtein};
use notewise_storage::{ClientScope, RecordStore};

pub struct NotewiseService {
	pub cfg: Config,
	pub store: Arc<dyn RecordStore>,
	pub cache: RecallCache,
	pub scorer: Arc<dyn SimilarityScorer>,
}
impl NotewiseService {
	/// Builds a service with a private recall cache sized from `recall.cache_ttl_secs`.
	pub fn new(cfg: Config, store: Arc<dyn RecordStore>) -> Self {
		let cache = RecallCache::new(Duration::from_secs(cfg.recall.cache_ttl_secs));

		Self::with_cache(cfg, store, cache)
	}

	pub fn with_cache(cfg: Config, store: Arc<dyn RecordStore>, cache: RecallCache) -> Self {
		Self { cfg, store, cache, scorer: Arc::new(SubstringLevenshtein) }
	}

	pub fn with_scorer(mut self, scorer: Arc<dyn SimilarityScorer>) -> Self {
		self.scorer = scorer;

		self
	}
}

pub(crate) fn client_scope<'a>(
	client_id: &'a str,
	therapist_id: &'a str,
) -> Result<ClientScope<'a>> {
	if client_id.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "client_id must be non-empty.".to_string() });
	}
	if therapist_id.trim().is_empty() {
		return Err(Error::InvalidRequest {
			message: "therapist_id must be non-empty.".to_string(),
		});
	}

	Ok(ClientScope { client_id, therapist_id })
}
