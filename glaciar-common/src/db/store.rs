//! Project store
//!
//! Persistence for [`Project`] records over SQLite. Lookups by business
//! `id` address the earliest stored record with that id; `key` is the
//! storage identity and is never reused.

use crate::db::init::{init_database, init_memory_database};
use crate::import::FIRST_ID;
use crate::model::{Project, ProjectFields, FIELDS};
use crate::{time, Result};
use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{QueryBuilder, Row, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Comma separated field columns, in [`FIELDS`] order
static FIELD_COLUMNS: Lazy<String> = Lazy::new(|| {
    FIELDS.iter().map(|f| f.key).collect::<Vec<_>>().join(", ")
});

static SELECT_COLUMNS: Lazy<String> =
    Lazy::new(|| format!("key, {}, created_at, updated_at", *FIELD_COLUMNS));

static INSERT_SQL: Lazy<String> = Lazy::new(|| {
    let placeholders = vec!["?"; FIELDS.len() + 2].join(", ");
    format!(
        "INSERT INTO proyectos ({}, created_at, updated_at) VALUES ({})",
        *FIELD_COLUMNS, placeholders
    )
});

static UPDATE_SQL: Lazy<String> = Lazy::new(|| {
    let assignments = FIELDS
        .iter()
        .map(|f| format!("{} = ?", f.key))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE proyectos SET {}, updated_at = ? \
         WHERE key = (SELECT key FROM proyectos WHERE id = ? ORDER BY key LIMIT 1)",
        assignments
    )
});

/// Bind every field in [`FIELDS`] order
fn bind_fields<'q>(query: SqliteQuery<'q>, f: &'q ProjectFields) -> SqliteQuery<'q> {
    query
        .bind(f.id)
        .bind(f.contrato.as_str())
        .bind(f.cliente.as_str())
        .bind(f.fecha_inicio)
        .bind(f.fecha_termino)
        .bind(f.duracion)
        .bind(f.region.as_str())
        .bind(f.ciudad.as_str())
        .bind(f.estado.as_str())
        .bind(f.monto)
        .bind(f.rut_cliente.as_str())
        .bind(f.tipo_cliente.as_str())
        .bind(f.persona_contacto.as_str())
        .bind(f.telefono_contacto.as_str())
        .bind(f.correo_contacto.as_str())
        .bind(f.superficie_terreno)
        .bind(f.superficie_construida)
        .bind(f.tipo_obra_lista.as_str())
        .bind(f.ems)
        .bind(f.estudio_sismico)
        .bind(f.estudio_geoelectrico)
        .bind(f.topografia)
        .bind(f.sondaje)
        .bind(f.hidraulica_hidrologia)
        .bind(f.descripcion.as_str())
        .bind(f.certificado_experiencia)
        .bind(f.orden_compra)
        .bind(f.contrato_doc)
        .bind(f.factura)
        .bind(f.fecha_factura)
        .bind(f.numero_factura.as_str())
        .bind(f.numero_orden_compra.as_str())
        .bind(f.link_documentos.as_str())
}

fn row_to_project(row: &SqliteRow) -> Result<Project> {
    let fields = ProjectFields {
        id: row.try_get("id")?,
        contrato: row.try_get("contrato")?,
        cliente: row.try_get("cliente")?,
        fecha_inicio: row.try_get("fecha_inicio")?,
        fecha_termino: row.try_get("fecha_termino")?,
        duracion: row.try_get("duracion")?,
        region: row.try_get("region")?,
        ciudad: row.try_get("ciudad")?,
        estado: row.try_get("estado")?,
        monto: row.try_get("monto")?,
        rut_cliente: row.try_get("rut_cliente")?,
        tipo_cliente: row.try_get("tipo_cliente")?,
        persona_contacto: row.try_get("persona_contacto")?,
        telefono_contacto: row.try_get("telefono_contacto")?,
        correo_contacto: row.try_get("correo_contacto")?,
        superficie_terreno: row.try_get("superficie_terreno")?,
        superficie_construida: row.try_get("superficie_construida")?,
        tipo_obra_lista: row.try_get("tipo_obra_lista")?,
        ems: row.try_get("ems")?,
        estudio_sismico: row.try_get("estudio_sismico")?,
        estudio_geoelectrico: row.try_get("estudio_geoelectrico")?,
        topografia: row.try_get("topografia")?,
        sondaje: row.try_get("sondaje")?,
        hidraulica_hidrologia: row.try_get("hidraulica_hidrologia")?,
        descripcion: row.try_get("descripcion")?,
        certificado_experiencia: row.try_get("certificado_experiencia")?,
        orden_compra: row.try_get("orden_compra")?,
        contrato_doc: row.try_get("contrato_doc")?,
        factura: row.try_get("factura")?,
        fecha_factura: row.try_get("fecha_factura")?,
        numero_factura: row.try_get("numero_factura")?,
        numero_orden_compra: row.try_get("numero_orden_compra")?,
        link_documentos: row.try_get("link_documentos")?,
    };

    Ok(Project {
        key: row.try_get("key")?,
        fields,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Listing filter
///
/// `text` matches a case-insensitive substring of `cliente` or `contrato`.
/// `estado` matches exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectQuery {
    pub text: Option<String>,
    pub estado: Option<String>,
}

impl ProjectQuery {
    /// Matches every project
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from raw query-string values
    ///
    /// Blank values are ignored, as is the `Select Status` placeholder the
    /// status dropdown sends when nothing is chosen.
    pub fn from_params(text: Option<&str>, estado: Option<&str>) -> Self {
        let text = text.map(str::trim).filter(|t| !t.is_empty()).map(String::from);
        let estado = estado
            .map(str::trim)
            .filter(|e| !e.is_empty() && *e != "Select Status")
            .map(String::from);
        Self { text, estado }
    }

    fn like_pattern(&self) -> Option<String> {
        self.text.as_ref().map(|t| {
            let escaped = t
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}

/// Outcome of an update: `matched` records found, `modified` records written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusStats {
    pub count: i64,
    pub total_amount: f64,
}

/// Portfolio rollup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_projects: i64,
    pub total_amount: f64,
    pub average_amount: f64,
    pub status_breakdown: BTreeMap<String, StatusStats>,
}

/// Handle on the `proyectos` table
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ProjectStore {
    pool: SqlitePool,
}

impl ProjectStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database file, creating and migrating it as needed
    pub async fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::from_pool(init_database(db_path).await?))
    }

    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::from_pool(init_memory_database().await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM proyectos")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Projects matching `query`, ordered by business id then insertion
    pub async fn find(&self, query: &ProjectQuery) -> Result<Vec<Project>> {
        let sql = format!(
            r#"
            SELECT {} FROM proyectos
            WHERE (?1 IS NULL OR cliente LIKE ?1 ESCAPE '\' OR contrato LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR estado = ?2)
            ORDER BY id ASC, key ASC
            "#,
            *SELECT_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(query.like_pattern())
            .bind(query.estado.as_deref())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_project).collect()
    }

    /// Earliest stored project with business id `id`
    pub async fn find_one(&self, id: i64) -> Result<Option<Project>> {
        let sql = format!(
            "SELECT {} FROM proyectos WHERE id = ? ORDER BY key LIMIT 1",
            *SELECT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_project).transpose()
    }

    pub async fn find_by_key(&self, key: i64) -> Result<Option<Project>> {
        let sql = format!("SELECT {} FROM proyectos WHERE key = ?", *SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_project).transpose()
    }

    /// Insert one project and return it as stored
    pub async fn insert_one(&self, fields: &ProjectFields) -> Result<Project> {
        let now = time::now();
        let result = bind_fields(sqlx::query(INSERT_SQL.as_str()), fields)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;

        let key = result.last_insert_rowid();
        debug!(key, id = ?fields.id, "Inserted project");

        self.find_by_key(key)
            .await?
            .ok_or_else(|| crate::Error::Internal(format!("inserted project {} not found", key)))
    }

    /// Insert a batch atomically, returning the storage keys in order
    pub async fn insert_many(&self, batch: &[ProjectFields]) -> Result<Vec<i64>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let now = time::now();
        let mut tx = self.pool.begin().await?;
        let mut keys = Vec::with_capacity(batch.len());

        for fields in batch {
            let result = bind_fields(sqlx::query(INSERT_SQL.as_str()), fields)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            keys.push(result.last_insert_rowid());
        }

        tx.commit().await?;
        debug!(count = keys.len(), "Inserted project batch");
        Ok(keys)
    }

    /// Overwrite the fields of the project with business id `id`
    pub async fn update_one(&self, id: i64, fields: &ProjectFields) -> Result<UpdateResult> {
        let result = bind_fields(sqlx::query(UPDATE_SQL.as_str()), fields)
            .bind(time::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        // Every write refreshes updated_at, so a matched row is always modified
        let affected = result.rows_affected();
        Ok(UpdateResult {
            matched: affected,
            modified: affected,
        })
    }

    /// Delete the project with business id `id`; returns the number removed
    pub async fn delete_one(&self, id: i64) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM proyectos WHERE key = (SELECT key FROM proyectos WHERE id = ? ORDER BY key LIMIT 1)",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete every project whose business id is in `ids`
    pub async fn delete_many(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM proyectos WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Largest business id in the store, if any project has one
    pub async fn max_id(&self) -> Result<Option<i64>> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(id) FROM proyectos")
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }

    /// Next business id to hand out
    ///
    /// Fails with [`crate::Error::InvalidInput`] once `i64::MAX` is taken.
    pub async fn next_id(&self) -> Result<i64> {
        match self.max_id().await? {
            Some(max) if max > 0 => max.checked_add(1).ok_or_else(|| {
                crate::Error::InvalidInput("No hay IDs disponibles: se alcanzó el ID máximo".to_string())
            }),
            _ => Ok(FIRST_ID),
        }
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        let rows: Vec<(String, i64, f64)> = sqlx::query_as(
            r#"
            SELECT estado, COUNT(*), COALESCE(SUM(monto), 0.0)
            FROM proyectos
            GROUP BY estado
            ORDER BY estado
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stats = Statistics {
            total_projects: 0,
            total_amount: 0.0,
            average_amount: 0.0,
            status_breakdown: BTreeMap::new(),
        };

        for (estado, count, total_amount) in rows {
            stats.total_projects += count;
            stats.total_amount += total_amount;
            stats
                .status_breakdown
                .insert(estado, StatusStats { count, total_amount });
        }

        if stats.total_projects > 0 {
            stats.average_amount = stats.total_amount / stats.total_projects as f64;
        }

        Ok(stats)
    }
}
