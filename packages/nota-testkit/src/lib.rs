//! Test support for the notes workspace: per-test Postgres databases that come up with the notes
//! schema applied, and an in-process [`MemoryNoteStore`].

mod error;
mod memory;

pub use error::{Error, Result};
pub use memory::MemoryNoteStore;

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection, PgPoolOptions},
};
use tokio::runtime;
use uuid::Uuid;

use nota_storage::db::Db;

/// Environment variable holding the server DSN the ignored Postgres tests run against.
pub const PG_DSN_VAR: &str = "NOTA_PG_DSN";

const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];
const POOL_MAX_CONNS: u32 = 2;

pub fn env_dsn() -> Option<String> {
	env::var(PG_DSN_VAR).ok()
}

/// A database created for one test. [`TestDatabase::teardown`] drops it; otherwise `Drop` tries to,
/// which covers tests that panic before reaching teardown.
pub struct TestDatabase {
	name: String,
	options: PgConnectOptions,
	server: Server,
	dropped: bool,
}
impl TestDatabase {
	/// Creates an empty database next to the one `base_dsn` points at.
	pub async fn create(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("{PG_DSN_VAR} is not a valid DSN: {err}.")))?;
		let server = Server::reach(&base).await?;
		let name = format!("nota_test_{}", Uuid::new_v4().simple());

		server.run(&format!(r#"CREATE DATABASE "{name}""#)).await?;

		Ok(Self { options: base.database(&name), name, server, dropped: false })
	}

	/// Connection string for callers that build their own pool, such as the API state.
	pub fn dsn(&self) -> String {
		self.options.to_url_lossy().to_string()
	}

	/// Opens a small pool on this database and applies the notes schema.
	pub async fn connect(&self) -> Result<Db> {
		let pool = PgPoolOptions::new()
			.max_connections(POOL_MAX_CONNS)
			.connect_with(self.options.clone())
			.await?;
		let db = Db { pool };

		db.ensure_schema().await?;

		Ok(db)
	}

	pub async fn teardown(mut self) -> Result<()> {
		self.server.drop_database(&self.name).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let (name, server) = (&self.name, &self.server);

		// The owning test may still be inside a runtime, which cannot be blocked on from here.
		thread::scope(|scope| {
			scope.spawn(|| {
				let outcome = runtime::Builder::new_current_thread()
					.enable_all()
					.build()
					.map_err(|err| Error::Message(err.to_string()))
					.and_then(|rt| rt.block_on(server.drop_database(name)));

				if let Err(err) = outcome {
					eprintln!("Leaked test database {name}: {err}");
				}
			});
		});
	}
}

/// A maintenance database on the test server, used to create and drop per-test databases.
struct Server {
	options: PgConnectOptions,
}
impl Server {
	async fn reach(base: &PgConnectOptions) -> Result<Self> {
		let mut failures = Vec::new();

		for database in MAINTENANCE_DATABASES {
			let options = base.clone().database(database);

			match PgConnection::connect_with(&options).await {
				Ok(conn) => {
					conn.close().await?;

					return Ok(Self { options });
				},
				Err(err) => failures.push(format!("{database}: {err}")),
			}
		}

		Err(Error::Message(format!(
			"No maintenance database is reachable ({}).",
			failures.join("; ")
		)))
	}

	async fn run(&self, sql: &str) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.options).await?;

		sqlx::query(sql).execute(&mut conn).await?;

		Ok(())
	}

	async fn drop_database(&self, name: &str) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.options).await?;

		// Pools from the test may still hold sessions, and DROP DATABASE refuses while any remain.
		sqlx::query(
			"SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
			WHERE datname = $1 AND pid <> pg_backend_pid()",
		)
		.bind(name)
		.execute(&mut conn)
		.await?;
		sqlx::query(&format!(r#"DROP DATABASE IF EXISTS "{name}""#)).execute(&mut conn).await?;

		Ok(())
	}
}
