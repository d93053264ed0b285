use std::sync::Once;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{migrate::MigrateDatabase, AnyPool, Row, Sqlite};

use crate::types::{Item, ItemFilter, ItemInput, Status, StatusCounts};

/// Database backend, selected by the URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> anyhow::Result<Backend> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            Err(anyhow::anyhow!("unsupported database url scheme in {:?}", url))
        }
    }
}

static INSTALL_DRIVERS: Once = Once::new();

/// Handle to the item store.
///
/// Wraps the connection pool together with the backend kind so the few
/// places where Postgres and SQLite differ (DDL, pragmas) can branch on it.
/// Everything else speaks one portable SQL dialect with `$n` placeholders.
#[derive(Clone)]
pub struct Store {
    pool: AnyPool,
    backend: Backend,
}

impl Store {
    /// Connect to the database behind `url`. SQLite databases are created on
    /// demand, including their parent directory.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Store> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let backend = Backend::from_url(url)?;
        if backend == Backend::Sqlite {
            crate::config::ensure_sqlite_parent_dir(url)?;
            if !Sqlite::database_exists(url).await.unwrap_or(false) {
                tracing::info!("Creating SQLite database at {}", url);
                Sqlite::create_database(url).await?;
            }
        }

        let is_sqlite = backend == Backend::Sqlite;
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if is_sqlite {
                        let _ = sqlx::query("PRAGMA busy_timeout=10000;").execute(&mut *conn).await;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await?;

        Ok(Store { pool, backend })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Create the `items` table and its indexes when missing. DDL is the one
    /// place where the two backends genuinely differ.
    pub async fn init_schema(&self) -> anyhow::Result<()> {
        if self.backend == Backend::Sqlite {
            // Pragmas for better durability/performance (best-effort)
            if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(&self.pool).await {
                tracing::warn!("Failed to set WAL journal mode: {}", e);
            }
            if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(&self.pool).await {
                tracing::warn!("Failed to set synchronous mode: {}", e);
            }
        }

        let ddl = match self.backend {
            Backend::Postgres => {
                r#"CREATE TABLE IF NOT EXISTS items (
                    id BIGSERIAL PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NULL,
                    status TEXT NOT NULL DEFAULT 'todo',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )"#
            }
            Backend::Sqlite => {
                r#"CREATE TABLE IF NOT EXISTS items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    description TEXT NULL,
                    status TEXT NOT NULL DEFAULT 'todo',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )"#
            }
        };
        sqlx::query(ddl).execute(&self.pool).await?;

        let indexes = [
            ("idx_items_created_at", "CREATE INDEX IF NOT EXISTS idx_items_created_at ON items(created_at DESC)"),
            ("idx_items_status", "CREATE INDEX IF NOT EXISTS idx_items_status ON items(status)"),
        ];
        for (name, query) in indexes {
            if let Err(e) = sqlx::query(query).execute(&self.pool).await {
                tracing::warn!("Failed to create index {}: {}", name, e);
            }
        }

        Ok(())
    }

    /// Connectivity check for the readiness probe.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool and wait for in-flight connections to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Items matching the filter, newest first.
    pub async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, sqlx::Error> {
        let (sql, binds) = build_list_query(filter);
        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(item_from_row).collect()
    }

    /// Counts per status over the whole table, independent of any filter.
    pub async fn status_counts(&self) -> Result<StatusCounts, sqlx::Error> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS cnt FROM items GROUP BY status")
            .fetch_all(&self.pool)
            .await?;
        let mut counts = StatusCounts::default();
        for row in rows {
            let status: String = row.try_get("status")?;
            let cnt: i64 = row.try_get("cnt")?;
            counts.all += cnt;
            match Status::parse(&status) {
                Some(Status::Todo) => counts.todo = cnt,
                Some(Status::InProgress) => counts.in_progress = cnt,
                Some(Status::Done) => counts.done = cnt,
                None => {}
            }
        }
        Ok(counts)
    }

    pub async fn get_item(&self, id: i64) -> Result<Option<Item>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, title, COALESCE(description, '') AS description, status, \
             created_at, updated_at FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    /// Insert a new item. Timestamps are assigned here, not by SQL, so they
    /// are identical text on both backends. Returns the new id.
    ///
    /// The insert runs in an explicit transaction: fetching the RETURNING
    /// row resolves before the statement finishes, so the id is only handed
    /// out once the commit makes the row visible to other connections.
    pub async fn insert_item(&self, input: &ItemInput) -> Result<i64, sqlx::Error> {
        let now = format_timestamp(Utc::now());
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "INSERT INTO items (title, description, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(input.title.as_str())
        .bind(input.description.as_deref())
        .bind(input.status.as_str())
        .bind(now.as_str())
        .bind(now.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let id: i64 = row.try_get("id")?;
        tx.commit().await?;
        Ok(id)
    }

    /// Overwrite title, description and status. Returns false when the id
    /// does not exist (last write wins, nothing to report otherwise).
    pub async fn update_item(&self, id: i64, input: &ItemInput) -> Result<bool, sqlx::Error> {
        let now = format_timestamp(Utc::now());
        let result = sqlx::query(
            "UPDATE items SET title = $1, description = $2, status = $3, updated_at = $4 WHERE id = $5",
        )
        .bind(input.title.as_str())
        .bind(input.description.as_deref())
        .bind(input.status.as_str())
        .bind(now.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_item(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

const LIKE_ESCAPE: char = '!';

fn escape_like_pattern(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(ch);
    }
    out
}

/// Assemble the listing SELECT for a filter. Placeholders are numbered so
/// the identical SQL runs on Postgres natively and on SQLite via its `$NNN`
/// parameter form. The match is case-insensitive through LOWER() because
/// Postgres LIKE is case-sensitive and ILIKE is not portable.
fn build_list_query(filter: &ItemFilter) -> (String, Vec<String>) {
    let mut sql = String::from(
        "SELECT id, title, COALESCE(description, '') AS description, status, \
         created_at, updated_at FROM items",
    );
    let mut binds: Vec<String> = Vec::new();

    if let Some(status) = &filter.status {
        binds.push(status.clone());
        sql.push_str(&format!(" WHERE status = ${}", binds.len()));
    }
    if let Some(q) = &filter.q {
        binds.push(format!("%{}%", escape_like_pattern(&q.to_lowercase())));
        let n = binds.len();
        sql.push_str(if n == 1 { " WHERE " } else { " AND " });
        sql.push_str(&format!(
            "(LOWER(title) LIKE ${n} ESCAPE '!' OR LOWER(description) LIKE ${n} ESCAPE '!')"
        ));
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");
    (sql, binds)
}

fn item_from_row(row: &AnyRow) -> Result<Item, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    let status_raw: String = row.try_get("status")?;
    let status = Status::parse(&status_raw).unwrap_or_else(|| {
        // Rows written by this app always hold a known value; be lenient
        // with hand-edited databases instead of failing the whole page.
        tracing::warn!("Item {} has unknown status {:?} - treating as todo", id, status_raw);
        Status::Todo
    });
    // description is selected as COALESCE(description, ''): the Any driver
    // cannot decode SQL NULL, so absent text arrives as an empty string.
    let description: String = row.try_get("description")?;
    Ok(Item {
        id,
        title: row.try_get("title")?,
        description: if description.is_empty() { None } else { Some(description) },
        status,
        created_at: parse_timestamp(row, "created_at")?,
        updated_at: parse_timestamp(row, "updated_at")?,
    })
}

fn parse_timestamp(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    DateTime::parse_from_rfc3339(&raw).map(|dt| dt.with_timezone(&Utc)).map_err(|e| {
        sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(e) }
    })
}

/// Timestamps are stored as RFC 3339 UTC text with fixed-width microseconds,
/// which makes lexicographic order equal chronological order on both
/// backends.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::{build_list_query, escape_like_pattern, format_timestamp};
    use crate::types::ItemFilter;
    use chrono::{TimeZone, Utc};

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(escape_like_pattern("50%_done!"), "50!%!_done!!");
        assert_eq!(escape_like_pattern("plain"), "plain");
    }

    #[test]
    fn list_query_without_filter_has_no_where() {
        let (sql, binds) = build_list_query(&ItemFilter::default());
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("COALESCE(description, '') AS description"));
        assert!(sql.ends_with("ORDER BY created_at DESC, id DESC"));
        assert!(binds.is_empty());
    }

    #[test]
    fn list_query_numbers_placeholders() {
        let filter = ItemFilter { status: Some("done".into()), q: Some("Report".into()) };
        let (sql, binds) = build_list_query(&filter);
        assert!(sql.contains("WHERE status = $1"));
        assert!(sql.contains("LOWER(title) LIKE $2 ESCAPE '!'"));
        assert!(sql.contains("LOWER(description) LIKE $2 ESCAPE '!'"));
        assert_eq!(binds, vec!["done".to_string(), "%report%".to_string()]);
    }

    #[test]
    fn search_term_is_lowercased_and_escaped() {
        let filter = ItemFilter { status: None, q: Some("100%_Done".into()) };
        let (sql, binds) = build_list_query(&filter);
        assert!(sql.contains(" WHERE (LOWER(title) LIKE $1"));
        assert_eq!(binds, vec!["%100!%!_done%".to_string()]);
    }

    #[test]
    fn timestamps_have_fixed_width() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(format_timestamp(ts), "2024-03-07T09:05:01.000000Z");
    }
}
