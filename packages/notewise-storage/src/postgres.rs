//! Postgres-backed [`RecordStore`].

use std::str::FromStr;

use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use notewise_domain::category::{InsightType, TagCategory, TagSet};

use crate::{
	Error, Result,
	db::Db,
	models::{InsightRecord, JourneySnapshot, NewTagRecord, Note, TagRecord},
	queries,
	store::{BoxFuture, ClientScope, DateRange, RecordStore},
};

#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
	note_id: Uuid,
	session_id: Uuid,
	client_id: String,
	therapist_id: String,
	content: Option<String>,
	session_date: OffsetDateTime,
	created_at: OffsetDateTime,
}
impl From<NoteRow> for Note {
	fn from(row: NoteRow) -> Self {
		Self {
			note_id: row.note_id,
			session_id: row.session_id,
			client_id: row.client_id,
			therapist_id: row.therapist_id,
			content: row.content,
			session_date: row.session_date,
			created_at: row.created_at,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
	tag_id: Uuid,
	session_id: Uuid,
	client_id: String,
	therapist_id: String,
	category: String,
	tags: Json<Vec<String>>,
	confidence: i16,
	session_date: OffsetDateTime,
	created_at: OffsetDateTime,
}
impl TryFrom<TagRow> for TagRecord {
	type Error = Error;

	fn try_from(row: TagRow) -> Result<Self> {
		Ok(Self {
			tag_id: row.tag_id,
			session_id: row.session_id,
			client_id: row.client_id,
			therapist_id: row.therapist_id,
			category: decode_label::<TagCategory>("category", &row.category)?,
			tags: TagSet::from(row.tags.0),
			confidence: decode_confidence(row.confidence)?,
			session_date: row.session_date,
			created_at: row.created_at,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
struct InsightRow {
	insight_id: Uuid,
	session_id: Uuid,
	client_id: String,
	therapist_id: String,
	insight_text: String,
	insight_type: String,
	confidence: i16,
	created_at: OffsetDateTime,
}
impl TryFrom<InsightRow> for InsightRecord {
	type Error = Error;

	fn try_from(row: InsightRow) -> Result<Self> {
		Ok(Self {
			insight_id: row.insight_id,
			session_id: row.session_id,
			client_id: row.client_id,
			therapist_id: row.therapist_id,
			text: row.insight_text,
			insight_type: decode_label::<InsightType>("insight_type", &row.insight_type)?,
			confidence: decode_confidence(row.confidence)?,
			created_at: row.created_at,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
struct JourneyRow {
	synthesis_id: Uuid,
	client_id: String,
	therapist_id: String,
	synthesized_at: OffsetDateTime,
	range_start: OffsetDateTime,
	range_end: OffsetDateTime,
	payload: serde_json::Value,
}
impl From<JourneyRow> for JourneySnapshot {
	fn from(row: JourneyRow) -> Self {
		Self {
			synthesis_id: row.synthesis_id,
			client_id: row.client_id,
			therapist_id: row.therapist_id,
			synthesized_at: row.synthesized_at,
			range_start: row.range_start,
			range_end: row.range_end,
			payload: row.payload,
		}
	}
}

const TAG_COLUMNS: &str = "\
\tt.tag_id,
\tt.session_id,
\tt.client_id,
\tt.therapist_id,
\tt.category,
\tt.tags,
\tt.confidence,
\tn.session_date,
\tt.created_at
FROM session_tags t
JOIN session_notes n
\tON n.session_id = t.session_id
\tAND n.client_id = t.client_id
\tAND n.therapist_id = t.therapist_id";

impl RecordStore for Db {
	fn insert_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			queries::validate_scope(ClientScope {
				client_id: &note.client_id,
				therapist_id: &note.therapist_id,
			})?;

			let res = sqlx::query(
				"\
INSERT INTO session_notes (
\tnote_id,
\tsession_id,
\tclient_id,
\ttherapist_id,
\tcontent,
\tsession_date,
\tcreated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7)
ON CONFLICT (client_id, therapist_id, session_id) DO NOTHING",
			)
			.bind(note.note_id)
			.bind(note.session_id)
			.bind(note.client_id.as_str())
			.bind(note.therapist_id.as_str())
			.bind(note.content.as_deref())
			.bind(note.session_date)
			.bind(note.created_at)
			.execute(&self.pool)
			.await?;

			if res.rows_affected() == 0 {
				return Err(Error::Conflict(format!(
					"session already has a note; session_id={}",
					note.session_id
				)));
			}

			Ok(())
		})
	}

	fn insert_tag_record<'a>(&'a self, record: &'a NewTagRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			queries::validate_scope(ClientScope {
				client_id: &record.client_id,
				therapist_id: &record.therapist_id,
			})?;
			queries::validate_confidence(record.confidence)?;

			sqlx::query(
				"\
INSERT INTO session_tags (
\ttag_id,
\tsession_id,
\tclient_id,
\ttherapist_id,
\tcategory,
\ttags,
\tconfidence,
\tcreated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
			)
			.bind(record.tag_id)
			.bind(record.session_id)
			.bind(record.client_id.as_str())
			.bind(record.therapist_id.as_str())
			.bind(record.category.as_str())
			.bind(Json(record.tags.as_slice()))
			.bind(i16::from(record.confidence))
			.bind(record.created_at)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn insert_insight<'a>(&'a self, insight: &'a InsightRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			queries::validate_scope(ClientScope {
				client_id: &insight.client_id,
				therapist_id: &insight.therapist_id,
			})?;
			queries::validate_confidence(insight.confidence)?;

			sqlx::query(
				"\
INSERT INTO session_insights (
\tinsight_id,
\tsession_id,
\tclient_id,
\ttherapist_id,
\tinsight_text,
\tinsight_type,
\tconfidence,
\tcreated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
			)
			.bind(insight.insight_id)
			.bind(insight.session_id)
			.bind(insight.client_id.as_str())
			.bind(insight.therapist_id.as_str())
			.bind(insight.text.as_str())
			.bind(insight.insight_type.as_str())
			.bind(i16::from(insight.confidence))
			.bind(insight.created_at)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn insert_journey<'a>(&'a self, snapshot: &'a JourneySnapshot) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			queries::validate_scope(ClientScope {
				client_id: &snapshot.client_id,
				therapist_id: &snapshot.therapist_id,
			})?;

			sqlx::query(
				"\
INSERT INTO journey_syntheses (
\tsynthesis_id,
\tclient_id,
\ttherapist_id,
\tsynthesized_at,
\trange_start,
\trange_end,
\tpayload
)
VALUES ($1,$2,$3,$4,$5,$6,$7)",
			)
			.bind(snapshot.synthesis_id)
			.bind(snapshot.client_id.as_str())
			.bind(snapshot.therapist_id.as_str())
			.bind(snapshot.synthesized_at)
			.bind(snapshot.range_start)
			.bind(snapshot.range_end)
			.bind(&snapshot.payload)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn list_notes<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<Note>>> {
		Box::pin(async move {
			let rows = sqlx::query_as::<_, NoteRow>(
				"\
SELECT note_id, session_id, client_id, therapist_id, content, session_date, created_at
FROM session_notes
WHERE client_id = $1 AND therapist_id = $2 AND session_date BETWEEN $3 AND $4
ORDER BY session_date DESC",
			)
			.bind(scope.client_id)
			.bind(scope.therapist_id)
			.bind(range.start)
			.bind(range.end)
			.fetch_all(&self.pool)
			.await?;

			Ok(rows.into_iter().map(Note::from).collect())
		})
	}

	fn list_tag_records<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<TagRecord>>> {
		Box::pin(async move {
			let sql = format!(
				"\
SELECT
{TAG_COLUMNS}
WHERE t.client_id = $1 AND t.therapist_id = $2 AND n.session_date BETWEEN $3 AND $4
ORDER BY n.session_date ASC, t.created_at ASC"
			);
			let rows = sqlx::query_as::<_, TagRow>(&sql)
				.bind(scope.client_id)
				.bind(scope.therapist_id)
				.bind(range.start)
				.bind(range.end)
				.fetch_all(&self.pool)
				.await?;

			rows.into_iter().map(TagRecord::try_from).collect()
		})
	}

	fn list_insights<'a>(
		&'a self,
		scope: ClientScope<'a>,
		range: DateRange,
	) -> BoxFuture<'a, Result<Vec<InsightRecord>>> {
		Box::pin(async move {
			let rows = sqlx::query_as::<_, InsightRow>(
				"\
SELECT
\ti.insight_id,
\ti.session_id,
\ti.client_id,
\ti.therapist_id,
\ti.insight_text,
\ti.insight_type,
\ti.confidence,
\ti.created_at
FROM session_insights i
JOIN session_notes n
\tON n.session_id = i.session_id
\tAND n.client_id = i.client_id
\tAND n.therapist_id = i.therapist_id
WHERE i.client_id = $1 AND i.therapist_id = $2 AND n.session_date BETWEEN $3 AND $4
ORDER BY n.session_date DESC, i.created_at DESC",
			)
			.bind(scope.client_id)
			.bind(scope.therapist_id)
			.bind(range.start)
			.bind(range.end)
			.fetch_all(&self.pool)
			.await?;

			rows.into_iter().map(InsightRecord::try_from).collect()
		})
	}

	fn list_journeys<'a>(
		&'a self,
		scope: ClientScope<'a>,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<JourneySnapshot>>> {
		Box::pin(async move {
			let rows = sqlx::query_as::<_, JourneyRow>(
				"\
SELECT
\tsynthesis_id,
\tclient_id,
\ttherapist_id,
\tsynthesized_at,
\trange_start,
\trange_end,
\tpayload
FROM journey_syntheses
WHERE client_id = $1 AND therapist_id = $2
ORDER BY synthesized_at DESC
LIMIT $3",
			)
			.bind(scope.client_id)
			.bind(scope.therapist_id)
			.bind(i64::from(limit))
			.fetch_all(&self.pool)
			.await?;

			Ok(rows.into_iter().map(JourneySnapshot::from).collect())
		})
	}

	fn search_notes<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<Note>>> {
		Box::pin(async move {
			let rows = sqlx::query_as::<_, NoteRow>(
				"\
SELECT n.note_id, n.session_id, n.client_id, n.therapist_id, n.content, n.session_date, n.created_at
FROM session_notes n
WHERE n.client_id = $1
\tAND n.therapist_id = $2
\tAND (
\t\tn.content ILIKE $3 ESCAPE '\\'
\t\tOR EXISTS (
\t\t\tSELECT 1
\t\t\tFROM session_tags t
\t\t\tWHERE t.session_id = n.session_id
\t\t\t\tAND t.client_id = n.client_id
\t\t\t\tAND t.therapist_id = n.therapist_id
\t\t\t\tAND t.tags::text ILIKE $3 ESCAPE '\\'
\t\t)
\t)
ORDER BY n.session_date DESC",
			)
			.bind(scope.client_id)
			.bind(scope.therapist_id)
			.bind(queries::contains_pattern(needle))
			.fetch_all(&self.pool)
			.await?;

			Ok(rows.into_iter().map(Note::from).collect())
		})
	}

	fn search_insights<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<InsightRecord>>> {
		Box::pin(async move {
			let rows = sqlx::query_as::<_, InsightRow>(
				"\
SELECT
\tinsight_id,
\tsession_id,
\tclient_id,
\ttherapist_id,
\tinsight_text,
\tinsight_type,
\tconfidence,
\tcreated_at
FROM session_insights
WHERE client_id = $1 AND therapist_id = $2 AND insight_text ILIKE $3 ESCAPE '\\'
ORDER BY created_at DESC",
			)
			.bind(scope.client_id)
			.bind(scope.therapist_id)
			.bind(queries::contains_pattern(needle))
			.fetch_all(&self.pool)
			.await?;

			rows.into_iter().map(InsightRecord::try_from).collect()
		})
	}

	fn search_tag_records<'a>(
		&'a self,
		scope: ClientScope<'a>,
		needle: &'a str,
	) -> BoxFuture<'a, Result<Vec<TagRecord>>> {
		Box::pin(async move {
			let sql = format!(
				"\
SELECT
{TAG_COLUMNS}
WHERE t.client_id = $1 AND t.therapist_id = $2 AND t.tags::text ILIKE $3 ESCAPE '\\'
ORDER BY n.session_date DESC"
			);
			let rows = sqlx::query_as::<_, TagRow>(&sql)
				.bind(scope.client_id)
				.bind(scope.therapist_id)
				.bind(queries::contains_pattern(needle))
				.fetch_all(&self.pool)
				.await?;

			rows.into_iter().map(TagRecord::try_from).collect()
		})
	}
}

fn decode_label<T>(label: &'static str, raw: &str) -> Result<T>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	T::from_str(raw).map_err(|err| Error::Decode { label, message: err.to_string() })
}

fn decode_confidence(raw: i16) -> Result<u8> {
	u8::try_from(raw)
		.ok()
		.filter(|confidence| *confidence <= 100)
		.ok_or_else(|| Error::Decode { label: "confidence", message: format!("{raw} is out of range.") })
}
