use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use notewise_storage::models::Note;

use crate::{NotewiseService, Result, TagRequest, tagging::TagReport, time_serde::Timestamp};

#[derive(Debug, Clone, Deserialize)]
pub struct AddNoteRequest {
	pub client_id: String,
	pub therapist_id: String,
	#[serde(default)]
	pub session_id: Option<Uuid>,
	pub content: Option<String>,
	#[serde(default)]
	pub session_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNoteResponse {
	pub note_id: Uuid,
	pub session_id: Uuid,
	#[serde(with = "crate::time_serde")]
	pub session_date: OffsetDateTime,
	pub report: TagReport,
}

impl NotewiseService {
	/// Stores a session note, then tags it. A failed note write fails the call; tag and insight
	/// write failures only show up in the report.
	pub async fn add_note(&self, req: AddNoteRequest) -> Result<AddNoteResponse> {
		crate::client_scope(&req.client_id, &req.therapist_id)?;

		let now = OffsetDateTime::now_utc();
		let note = Note {
			note_id: Uuid::new_v4(),
			session_id: req.session_id.unwrap_or_else(Uuid::new_v4),
			client_id: req.client_id,
			therapist_id: req.therapist_id,
			content: req.content,
			session_date: req.session_date.map(|date| date.0).unwrap_or(now),
			created_at: now,
		};

		self.store.insert_note(&note).await?;

		let report = self
			.tag(TagRequest {
				session_id: note.session_id,
				client_id: note.client_id.clone(),
				therapist_id: note.therapist_id.clone(),
				content: note.content.clone(),
			})
			.await?;

		Ok(AddNoteResponse {
			note_id: note.note_id,
			session_id: note.session_id,
			session_date: note.session_date,
			report,
		})
	}
}
