//! Project record and status options

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Valid status values, in display order
pub const STATUS_OPTIONS: [&str; 3] = ["Activo", "Completado", "Pendiente"];

/// Default upper bound for `monto`
pub const DEFAULT_MONTO_MAX: f64 = 999_999_999.99;

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Estado {
    #[default]
    Activo,
    Completado,
    Pendiente,
}

impl Estado {
    pub const ALL: [Estado; 3] = [Estado::Activo, Estado::Completado, Estado::Pendiente];

    pub fn as_str(&self) -> &'static str {
        match self {
            Estado::Activo => "Activo",
            Estado::Completado => "Completado",
            Estado::Pendiente => "Pendiente",
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status parsing is exact: `activo` or `ACTIVO` are not valid states
impl FromStr for Estado {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Estado::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Business attributes of a project
///
/// This is both the candidate produced by the import pipeline and the
/// payload persisted by the store. `estado` stays a string so that a
/// candidate with an unknown status can still be built and reported by
/// the validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectFields {
    /// Business id (not unique, not the primary key)
    pub id: Option<i64>,
    pub contrato: String,
    pub cliente: String,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_termino: Option<NaiveDate>,
    /// Duration in days
    pub duracion: Option<i64>,
    pub region: String,
    pub ciudad: String,
    pub estado: String,
    pub monto: f64,

    // Client information
    pub rut_cliente: String,
    pub tipo_cliente: String,
    pub persona_contacto: String,
    pub telefono_contacto: String,
    pub correo_contacto: String,

    // Technical information
    pub superficie_terreno: Option<f64>,
    pub superficie_construida: Option<f64>,
    pub tipo_obra_lista: String,

    // Studies and services
    pub ems: bool,
    pub estudio_sismico: bool,
    pub estudio_geoelectrico: bool,
    pub topografia: bool,
    pub sondaje: bool,
    pub hidraulica_hidrologia: bool,
    pub descripcion: String,

    // Documents
    pub certificado_experiencia: bool,
    pub orden_compra: bool,
    pub contrato_doc: bool,
    pub factura: bool,
    pub fecha_factura: Option<NaiveDate>,
    pub numero_factura: String,
    pub numero_orden_compra: String,
    pub link_documentos: String,
}

impl Default for ProjectFields {
    fn default() -> Self {
        Self {
            id: None,
            contrato: String::new(),
            cliente: String::new(),
            fecha_inicio: None,
            fecha_termino: None,
            duracion: None,
            region: String::new(),
            ciudad: String::new(),
            estado: Estado::default().as_str().to_string(),
            monto: 0.0,
            rut_cliente: String::new(),
            tipo_cliente: String::new(),
            persona_contacto: String::new(),
            telefono_contacto: String::new(),
            correo_contacto: String::new(),
            superficie_terreno: None,
            superficie_construida: None,
            tipo_obra_lista: String::new(),
            ems: false,
            estudio_sismico: false,
            estudio_geoelectrico: false,
            topografia: false,
            sondaje: false,
            hidraulica_hidrologia: false,
            descripcion: String::new(),
            certificado_experiencia: false,
            orden_compra: false,
            contrato_doc: false,
            factura: false,
            fecha_factura: None,
            numero_factura: String::new(),
            numero_orden_compra: String::new(),
            link_documentos: String::new(),
        }
    }
}

impl ProjectFields {
    /// Parsed status, if the string is one of the valid options
    pub fn estado(&self) -> Option<Estado> {
        self.estado.parse().ok()
    }

    /// True when the business id is absent and should be assigned
    pub fn needs_id(&self) -> bool {
        matches!(self.id, None | Some(0))
    }
}

/// Persisted project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    /// Store primary key, distinct from the business `id`
    pub key: i64,
    #[serde(flatten)]
    pub fields: ProjectFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Proyecto(id={:?}, contrato='{}', cliente='{}', estado='{}', monto={})",
            self.fields.id, self.fields.contrato, self.fields.cliente, self.fields.estado, self.fields.monto
        )
    }
}
