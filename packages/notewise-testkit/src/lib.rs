mod error;
mod faulty;

pub use error::{Error, Result};
pub use faulty::{FaultyStore, StoreOp};

use std::{env, future::Future, str::FromStr};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

const DSN_VAR: &str = "NOTEWISE_PG_DSN";
const ADMIN_DATABASES: [&str; 2] = ["postgres", "template1"];

pub fn env_dsn() -> Option<String> {
	env::var(DSN_VAR).ok()
}

/// Runs `f` against the DSN of a fresh database on the server behind `base_dsn`, then drops
/// that database. A cleanup failure is only reported when `f` succeeded.
pub async fn with_test_db<F, Fut, T>(base_dsn: &str, f: F) -> Result<T>
where
	F: FnOnce(String) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let base = PgConnectOptions::from_str(base_dsn)
		.map_err(|err| Error::Message(format!("Failed to parse {DSN_VAR}: {err}.")))?;
	let (admin, mut conn) = connect_admin(&base).await?;
	let name = format!("notewise_test_{}", Uuid::new_v4().simple());

	conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
		.await
		.map_err(|err| Error::Message(format!("Failed to create {name}: {err}.")))?;
	conn.close().await?;

	let result = f(base.database(&name).to_url_lossy().to_string()).await;
	let dropped = drop_database(&admin, &name).await;

	match (result, dropped) {
		(Ok(value), Ok(())) => Ok(value),
		(Ok(_), Err(err)) => Err(err),
		(Err(err), dropped) => {
			if let Err(cleanup) = dropped {
				eprintln!("Leaked test database {name}: {cleanup}.");
			}

			Err(err)
		},
	}
}

async fn connect_admin(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut last_err = None;

	for database in ADMIN_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => last_err = Some(err),
		}
	}

	Err(Error::Message(format!("No admin database reachable: {last_err:?}.")))
}

async fn drop_database(admin: &PgConnectOptions, name: &str) -> Result<()> {
	let mut conn = PgConnection::connect_with(admin).await?;

	sqlx::query(
		"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.fetch_all(&mut conn)
	.await?;
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str()).await?;
	conn.close().await?;

	Ok(())
}
