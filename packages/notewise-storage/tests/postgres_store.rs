use time::{Duration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

use notewise_domain::category::{InsightType, TagCategory, TagSet};
use notewise_storage::{
	ClientScope, DateRange, Error, RecordStore,
	db::Db,
	models::{InsightRecord, NewTagRecord, Note},
};

const CLIENT: &str = "client-a";
const THERAPIST: &str = "therapist-a";

fn scope() -> ClientScope<'static> {
	ClientScope { client_id: CLIENT, therapist_id: THERAPIST }
}

fn all_time() -> DateRange {
	DateRange { start: OffsetDateTime::UNIX_EPOCH, end: datetime!(2100-01-01 0:00 UTC) }
}

fn note(session_id: Uuid, content: &str, session_date: OffsetDateTime) -> Note {
	Note {
		note_id: Uuid::new_v4(),
		session_id,
		client_id: CLIENT.to_string(),
		therapist_id: THERAPIST.to_string(),
		content: Some(content.to_string()),
		session_date,
		created_at: session_date,
	}
}

fn tag_record(session_id: Uuid, tags: &[&str], created_at: OffsetDateTime) -> NewTagRecord {
	NewTagRecord {
		tag_id: Uuid::new_v4(),
		session_id,
		client_id: CLIENT.to_string(),
		therapist_id: THERAPIST.to_string(),
		category: TagCategory::Themes,
		tags: tags.iter().map(|tag| tag.to_string()).collect::<TagSet>(),
		confidence: 64,
		created_at,
	}
}

fn insight(session_id: Uuid, text: &str, created_at: OffsetDateTime) -> InsightRecord {
	InsightRecord {
		insight_id: Uuid::new_v4(),
		session_id,
		client_id: CLIENT.to_string(),
		therapist_id: THERAPIST.to_string(),
		text: text.to_string(),
		insight_type: InsightType::Realization,
		confidence: 85,
		created_at,
	}
}

async fn connect(dsn: String) -> Db {
	let cfg = notewise_config::Postgres { dsn, pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to test database.");

	db.ensure_schema().await.expect("Failed to apply schema.");

	db
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOTEWISE_PG_DSN to run."]
async fn round_trips_tags_and_escapes_search_wildcards() {
	let Some(dsn) = notewise_testkit::env_dsn() else {
		eprintln!("Skipping; set NOTEWISE_PG_DSN to run this test.");

		return;
	};

	notewise_testkit::with_test_db(&dsn, |test_dsn| async move {
		let db = connect(test_dsn).await;

		// Applying twice must be harmless.
		db.ensure_schema().await.expect("Failed to re-apply schema.");

		let session_id = Uuid::new_v4();
		let session_date = datetime!(2026-01-05 9:00 UTC);
		let record = tag_record(session_id, &["self_esteem", "work"], session_date);

		db.insert_note(&note(session_id, "Progress is 100% visible.", session_date))
			.await
			.expect("Failed to insert note.");
		db.insert_tag_record(&record).await.expect("Failed to insert tag record.");

		let records =
			db.list_tag_records(scope(), all_time()).await.expect("Failed to list tag records.");

		assert_eq!(records.len(), 1);
		assert_eq!(records[0].category, TagCategory::Themes);
		assert_eq!(records[0].tags.as_slice(), record.tags.as_slice());
		assert_eq!(records[0].session_date, session_date);

		assert_eq!(db.search_notes(scope(), "100%").await.expect("Failed to search.").len(), 1);
		assert_eq!(
			db.search_notes(scope(), "self_esteem").await.expect("Failed to search.").len(),
			1
		);
		assert!(db.search_notes(scope(), "10_%").await.expect("Failed to search.").is_empty());

		db.pool.close().await;

		Ok(())
	})
	.await
	.expect("Test database run failed.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOTEWISE_PG_DSN to run."]
async fn sessions_hold_one_note_and_date_their_insights() {
	let Some(dsn) = notewise_testkit::env_dsn() else {
		eprintln!("Skipping; set NOTEWISE_PG_DSN to run this test.");

		return;
	};

	notewise_testkit::with_test_db(&dsn, |test_dsn| async move {
		let db = connect(test_dsn).await;
		let session_id = Uuid::new_v4();
		let session_date = datetime!(2025-01-10 9:00 UTC);
		let extracted_at = datetime!(2026-03-01 12:00 UTC);

		db.insert_note(&note(session_id, "first", session_date))
			.await
			.expect("Failed to insert note.");

		let err = db
			.insert_note(&note(session_id, "second", session_date + Duration::days(1)))
			.await
			.expect_err("Expected conflict.");

		assert!(matches!(err, Error::Conflict(_)));

		db.insert_tag_record(&tag_record(session_id, &["work"], extracted_at))
			.await
			.expect("Failed to insert tag record.");
		db.insert_insight(&insight(session_id, "I avoid conflict", extracted_at))
			.await
			.expect("Failed to insert insight.");

		assert_eq!(db.list_tag_records(scope(), all_time()).await.expect("List failed.").len(), 1);

		let january = DateRange {
			start: datetime!(2025-01-01 0:00 UTC),
			end: datetime!(2025-01-31 23:59 UTC),
		};
		let insights = db.list_insights(scope(), january).await.expect("List failed.");

		assert_eq!(insights.len(), 1);
		assert_eq!(insights[0].text, "I avoid conflict");

		let recent = DateRange { start: extracted_at - Duration::days(7), end: extracted_at };

		assert!(db.list_insights(scope(), recent).await.expect("List failed.").is_empty());

		db.pool.close().await;

		Ok(())
	})
	.await
	.expect("Test database run failed.");
}
