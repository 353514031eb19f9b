//! Database schema migrations
//!
//! Versioned, idempotent upgrades for databases created by older builds.
//! Each migration checks the current shape of the schema before changing
//! it, so running the full sequence on a fresh database is a no-op.
//!
//! Never edit a released migration. Add a new `migrate_vN` and bump
//! [`CURRENT_SCHEMA_VERSION`].

use crate::db::init::PROYECTOS_TABLE_DDL;
use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns 0 when nothing has been recorded yet
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("Migration v2 completed");
    }

    Ok(())
}

/// Migration v1: drop any unique constraint on `proyectos.id`
///
/// Early databases enforced unique business ids, which made re-importing
/// a spreadsheet with repeated ids fail. Ids are now free to repeat; the
/// plain index is recreated by init.
///
/// A `CREATE UNIQUE INDEX` is dropped directly. A `UNIQUE` written in the
/// column definition cannot be dropped in SQLite, so the table is rebuilt
/// without it.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: drop unique constraint on proyectos.id");

    let unique_indexes: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT il.name, il.origin FROM pragma_index_list('proyectos') AS il
        WHERE il."unique" = 1
          AND il.origin IN ('c', 'u')
          AND (SELECT COUNT(*) FROM pragma_index_info(il.name)) = 1
          AND (SELECT name FROM pragma_index_info(il.name)) = 'id'
        "#,
    )
    .fetch_all(pool)
    .await?;

    if unique_indexes.is_empty() {
        info!("  No unique constraint on proyectos.id - skipping");
        return Ok(());
    }

    let mut needs_rebuild = false;
    for (name, origin) in unique_indexes {
        if origin == "u" {
            warn!("  Column-level UNIQUE on proyectos.id ({}) - rebuilding table", name);
            needs_rebuild = true;
            continue;
        }
        sqlx::query(&format!("DROP INDEX IF EXISTS \"{}\"", name.replace('"', "\"\"")))
            .execute(pool)
            .await?;
        info!("  Dropped unique index {}", name);
    }

    if needs_rebuild {
        rebuild_proyectos_table(pool).await?;
    }

    Ok(())
}

/// Recreate `proyectos` from the current definition, keeping every row
///
/// Columns the old table lacks take their defaults. Storage keys are
/// copied, so existing keys stay valid.
async fn rebuild_proyectos_table(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("ALTER TABLE proyectos RENAME TO proyectos_legacy")
        .execute(&mut *tx)
        .await?;
    sqlx::query(PROYECTOS_TABLE_DDL).execute(&mut *tx).await?;

    let shared_columns: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT old.name FROM pragma_table_info('proyectos_legacy') AS old
        WHERE old.name IN (SELECT name FROM pragma_table_info('proyectos'))
        ORDER BY old.cid
        "#,
    )
    .fetch_all(&mut *tx)
    .await?;

    let columns = shared_columns
        .iter()
        .map(|c| format!("\"{}\"", c.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(", ");
    let copied = sqlx::query(&format!(
        "INSERT INTO proyectos ({0}) SELECT {0} FROM proyectos_legacy",
        columns
    ))
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query("DROP TABLE proyectos_legacy")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("  Rebuilt proyectos table ({} rows copied)", copied);
    Ok(())
}

/// Migration v2: add `link_documentos` to `proyectos`
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: add link_documentos column to proyectos");

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('proyectos') WHERE name = 'link_documentos'",
    )
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        info!("  link_documentos column already exists - skipping");
        return Ok(());
    }

    match sqlx::query("ALTER TABLE proyectos ADD COLUMN link_documentos TEXT NOT NULL DEFAULT ''")
        .execute(pool)
        .await
    {
        Ok(_) => {
            info!("  Added link_documentos column to proyectos table");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            info!("  link_documentos column added by concurrent connection - skipping");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
