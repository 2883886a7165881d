use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use notewise_domain::category::{InsightType, TagCategory, TagSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
	pub note_id: Uuid,
	pub session_id: Uuid,
	pub client_id: String,
	pub therapist_id: String,
	pub content: Option<String>,
	pub session_date: OffsetDateTime,
	pub created_at: OffsetDateTime,
}

/// Tag record as written by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTagRecord {
	pub tag_id: Uuid,
	pub session_id: Uuid,
	pub client_id: String,
	pub therapist_id: String,
	pub category: TagCategory,
	pub tags: TagSet,
	pub confidence: u8,
	pub created_at: OffsetDateTime,
}

/// Tag record as read back, joined with the session date of its note.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRecord {
	pub tag_id: Uuid,
	pub session_id: Uuid,
	pub client_id: String,
	pub therapist_id: String,
	pub category: TagCategory,
	pub tags: TagSet,
	pub confidence: u8,
	pub session_date: OffsetDateTime,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightRecord {
	pub insight_id: Uuid,
	pub session_id: Uuid,
	pub client_id: String,
	pub therapist_id: String,
	pub text: String,
	pub insight_type: InsightType,
	pub confidence: u8,
	pub created_at: OffsetDateTime,
}

/// A persisted journey synthesis. The payload is the serialized synthesis and is never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneySnapshot {
	pub synthesis_id: Uuid,
	pub client_id: String,
	pub therapist_id: String,
	pub synthesized_at: OffsetDateTime,
	pub range_start: OffsetDateTime,
	pub range_end: OffsetDateTime,
	pub payload: Value,
}
