//! Database initialization
//!
//! Creates the database file on first run, applies connection pragmas and
//! brings the schema up to date. Every step is idempotent.

use crate::db::migrations::run_migrations;
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (or create) the database at `db_path` and prepare the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets readers proceed while a bulk import holds the write lock
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Private in-memory database, used by tests and dry runs
///
/// The pool is pinned to a single connection that never expires: every
/// new connection to `sqlite::memory:` would see an empty database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_users_table(pool).await?;
    create_proyectos_table(pool).await?;

    // Older databases may predate columns or carry indexes that the
    // table definition below no longer has
    run_migrations(pool).await?;

    create_proyectos_indexes(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Login accounts. `role` is `admin` or `reader`.
async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'reader' CHECK (role IN ('admin', 'reader')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Project records
///
/// `key` is the storage identity. The business `id` may repeat or be
/// absent, so it is indexed but never unique.
pub(crate) const PROYECTOS_TABLE_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS proyectos (
        key INTEGER PRIMARY KEY AUTOINCREMENT,
        id INTEGER,
        contrato TEXT NOT NULL DEFAULT '',
        cliente TEXT NOT NULL DEFAULT '',
        fecha_inicio TEXT,
        fecha_termino TEXT,
        duracion INTEGER,
        region TEXT NOT NULL DEFAULT '',
        ciudad TEXT NOT NULL DEFAULT '',
        estado TEXT NOT NULL DEFAULT 'Activo',
        monto REAL NOT NULL DEFAULT 0,
        rut_cliente TEXT NOT NULL DEFAULT '',
        tipo_cliente TEXT NOT NULL DEFAULT '',
        persona_contacto TEXT NOT NULL DEFAULT '',
        telefono_contacto TEXT NOT NULL DEFAULT '',
        correo_contacto TEXT NOT NULL DEFAULT '',
        superficie_terreno REAL,
        superficie_construida REAL,
        tipo_obra_lista TEXT NOT NULL DEFAULT '',
        ems BOOLEAN NOT NULL DEFAULT 0,
        estudio_sismico BOOLEAN NOT NULL DEFAULT 0,
        estudio_geoelectrico BOOLEAN NOT NULL DEFAULT 0,
        topografia BOOLEAN NOT NULL DEFAULT 0,
        sondaje BOOLEAN NOT NULL DEFAULT 0,
        hidraulica_hidrologia BOOLEAN NOT NULL DEFAULT 0,
        descripcion TEXT NOT NULL DEFAULT '',
        certificado_experiencia BOOLEAN NOT NULL DEFAULT 0,
        orden_compra BOOLEAN NOT NULL DEFAULT 0,
        contrato_doc BOOLEAN NOT NULL DEFAULT 0,
        factura BOOLEAN NOT NULL DEFAULT 0,
        fecha_factura TEXT,
        numero_factura TEXT NOT NULL DEFAULT '',
        numero_orden_compra TEXT NOT NULL DEFAULT '',
        link_documentos TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMP NOT NULL,
        updated_at TIMESTAMP NOT NULL
    )
"#;

pub async fn create_proyectos_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(PROYECTOS_TABLE_DDL).execute(pool).await?;
    Ok(())
}

async fn create_proyectos_indexes(pool: &SqlitePool) -> Result<()> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_proyectos_id ON proyectos(id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_proyectos_estado_fecha ON proyectos(estado, fecha_inicio DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_proyectos_created_at ON proyectos(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}
