//! In-process TTL cache for recall results.

use std::{
	sync::Arc,
	time::{Duration, Instant},
};

use dashmap::DashMap;
use serde_json::Value;

use crate::recall::RecallResult;

const RECALL_CACHE_SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Clone)]
struct CacheEntry {
	result: RecallResult,
	inserted_at: Instant,
}

/// Shared recall cache. Clones share the same entries.
#[derive(Debug, Clone)]
pub struct RecallCache {
	entries: Arc<DashMap<String, CacheEntry>>,
	ttl: Duration,
}
impl RecallCache {
	pub fn new(ttl: Duration) -> Self {
		Self { entries: Arc::new(DashMap::new()), ttl }
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// A fresh entry for `key`. Expired entries are treated as absent.
	pub fn get(&self, key: &str) -> Option<RecallResult> {
		let entry = self.entries.get(key)?;

		if entry.inserted_at.elapsed() < self.ttl { Some(entry.result.clone()) } else { None }
	}

	pub fn insert(&self, key: String, result: RecallResult) {
		let ttl = self.ttl;

		self.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
		self.entries.insert(key, CacheEntry { result, inserted_at: Instant::now() });
	}
}

pub fn hash_cache_key(payload: &Value) -> Option<String> {
	let raw = serde_json::to_vec(payload).ok()?;

	Some(blake3::hash(&raw).to_hex().to_string())
}

pub fn cache_key_prefix(key: &str) -> &str {
	let len = key.len().min(12);

	&key[..len]
}

/// Key for one recall query of one client. The query is taken verbatim.
pub fn build_recall_cache_key(therapist_id: &str, client_id: &str, query: &str) -> Option<String> {
	let payload = serde_json::json!({
		"kind": "recall",
		"schema_version": RECALL_CACHE_SCHEMA_VERSION,
		"therapist_id": therapist_id,
		"client_id": client_id,
		"query": query,
	});

	hash_cache_key(&payload)
}
