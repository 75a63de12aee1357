use async_trait::async_trait;
use snip_core::repository::{ReadRepository, Repository, Result};
use snip_core::{ShortenedUrl, StorageError};
use sqlx::migrate::Migrator;
use sqlx::{MySqlPool, Row};
use tracing::{debug, info};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// MySQL implementation of the repository contract.
///
/// Records live in `shortened_urls`. Ids come from `AUTO_INCREMENT`.
/// Uniqueness of `original_url` is enforced by a unique index on its
/// SHA-256 digest, since `TEXT` columns cannot be indexed whole.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("migration failed: {e}")))?;
        info!("MySQL schema is up to date");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<ShortenedUrl> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    Ok(ShortenedUrl { id, original_url })
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn find_by_id(&self, id: u64) -> Result<Option<ShortenedUrl>> {
        let row = sqlx::query(
            r#"
            SELECT id, original_url
            FROM shortened_urls
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortenedUrl>> {
        let row = sqlx::query(
            r#"
            SELECT id, original_url
            FROM shortened_urls
            WHERE original_url_hash = UNHEX(SHA2(?, 256))
              AND original_url = ?
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_record).transpose()
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn save(&self, original_url: &str) -> Result<ShortenedUrl> {
        let result = sqlx::query(
            r#"
            INSERT INTO shortened_urls (original_url)
            VALUES (?)
            "#,
        )
        .bind(original_url)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_id();
                debug!(id, "Saved record in MySQL");
                Ok(ShortenedUrl::new(id, original_url))
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(original_url.to_owned()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}
