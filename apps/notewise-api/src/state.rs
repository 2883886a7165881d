use std::sync::Arc;

use color_eyre::eyre;

use notewise_config::{Config, StorageBackend};
use notewise_service::NotewiseService;
use notewise_storage::{MemoryStore, RecordStore, db::Db};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<NotewiseService>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let store: Arc<dyn RecordStore> = match config.storage.backend {
			StorageBackend::Memory => Arc::new(MemoryStore::new()),
			StorageBackend::Postgres => {
				let pg = config.storage.postgres.as_ref().ok_or_else(|| {
					eyre::eyre!("storage.postgres is required when storage.backend is postgres.")
				})?;
				let db = Db::connect(pg).await?;

				db.ensure_schema().await?;

				Arc::new(db)
			},
		};

		Ok(Self::with_service(NotewiseService::new(config, store)))
	}

	pub fn with_service(service: NotewiseService) -> Self {
		Self { service: Arc::new(service) }
	}
}
