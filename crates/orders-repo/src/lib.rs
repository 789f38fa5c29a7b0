#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a repo feature: `memory` or `sqlite`.");

use chrono::NaiveDate;
use orders_types::domain::bulk::OrderStats;
use orders_types::domain::order::*;
use orders_types::domain::query::PageRequest;
use orders_types::ports::order_repository::OrderRepository;
use orders_types::ports::order_repository::RepoError;

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub const DEFAULT_DATABASE_URL: &str = "sqlite://orders.db";

/// The repository selected at startup.
pub enum Repo {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteRepo),
}

pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(url).await
}

impl Repo {
    /// Uses SQLite when a database url is given (or when it is the only
    /// adapter compiled in), the in-memory map otherwise.
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        if let Some(url) = database_url {
            if let Some(repo) = Self::from_url(url).await? {
                return Ok(repo);
            }
        }
        Self::fallback().await
    }

    #[cfg(feature = "sqlite")]
    async fn from_url(url: &str) -> anyhow::Result<Option<Self>> {
        Ok(Some(Self::Sqlite(sqlite::SqliteRepo::new(url).await?)))
    }

    #[cfg(not(feature = "sqlite"))]
    async fn from_url(_: &str) -> anyhow::Result<Option<Self>> {
        Ok(None)
    }

    #[cfg(feature = "memory")]
    async fn fallback() -> anyhow::Result<Self> {
        Ok(Self::Memory(memory::InMemoryRepo::new()))
    }

    #[cfg(not(feature = "memory"))]
    async fn fallback() -> anyhow::Result<Self> {
        Ok(Self::Sqlite(
            sqlite::SqliteRepo::new(DEFAULT_DATABASE_URL).await?,
        ))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(_) => "sqlite",
        }
    }

    fn inner(&self) -> &dyn OrderRepository {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(r) => r,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(r) => r,
        }
    }
}

#[async_trait::async_trait]
impl OrderRepository for Repo {
    async fn create(&self, draft: NewOrder) -> Result<Order, RepoError> {
        self.inner().create(draft).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepoError> {
        self.inner().get(id).await
    }

    async fn list(&self, request: &PageRequest) -> Result<(Vec<Order>, u64), RepoError> {
        self.inner().list(request).await
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Option<Order>, RepoError> {
        self.inner().update(id, patch).await
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepoError> {
        self.inner().delete(id).await
    }

    async fn bulk_update_status(
        &self,
        ids: &[OrderId],
        status: OrderStatus,
    ) -> Result<u64, RepoError> {
        self.inner().bulk_update_status(ids, status).await
    }

    async fn bulk_duplicate(&self, ids: &[OrderId]) -> Result<Vec<OrderId>, RepoError> {
        self.inner().bulk_duplicate(ids).await
    }

    async fn bulk_delete(&self, ids: &[OrderId]) -> Result<u64, RepoError> {
        self.inner().bulk_delete(ids).await
    }

    async fn stats(&self, today: NaiveDate) -> Result<OrderStats, RepoError> {
        self.inner().stats(today).await
    }
}
