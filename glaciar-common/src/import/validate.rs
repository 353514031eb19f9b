//! Business-rule validation of a project candidate
//!
//! Every rule is checked and every violation reported; validation does not
//! stop at the first failure.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{Estado, ProjectFields, DEFAULT_MONTO_MAX, STATUS_OPTIONS};

/// Minimum trimmed length for contrato, cliente, region and ciudad
pub const MIN_TEXT_LEN: usize = 2;

/// One violated rule, rendered as the message shown to users
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{label} debe tener al menos 2 caracteres")]
    TooShort {
        field: &'static str,
        label: &'static str,
    },

    #[error("Estado inválido. Opciones válidas: {}", STATUS_OPTIONS.join(", "))]
    InvalidEstado(String),

    #[error("El monto no puede ser negativo")]
    NegativeMonto(f64),

    #[error("El monto es demasiado grande")]
    MontoTooLarge(f64),

    #[error("La fecha de inicio no puede ser futura")]
    FutureStartDate(NaiveDate),

    #[error("La fecha de término no puede ser anterior a la fecha de inicio")]
    EndBeforeStart {
        inicio: NaiveDate,
        termino: NaiveDate,
    },

    #[error("No hay IDs disponibles: se alcanzó el ID máximo")]
    IdExhausted,
}

impl ValidationError {
    /// Canonical key of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::TooShort { field, .. } => *field,
            ValidationError::InvalidEstado(_) => "estado",
            ValidationError::NegativeMonto(_) | ValidationError::MontoTooLarge(_) => "monto",
            ValidationError::FutureStartDate(_) => "fecha_inicio",
            ValidationError::EndBeforeStart { .. } => "fecha_termino",
            ValidationError::IdExhausted => "id",
        }
    }
}

/// Tunable limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRules {
    /// Inclusive ceiling for `monto`
    pub monto_max: f64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            monto_max: DEFAULT_MONTO_MAX,
        }
    }
}

/// Validation result: valid when no errors were collected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub errors: Vec<ValidationError>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable messages in rule order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Validate a candidate against the business rules
///
/// `today` is the reference date for the "start date not in the future"
/// rule.
pub fn validate(fields: &ProjectFields, rules: &ValidationRules, today: NaiveDate) -> Validation {
    let mut errors = Vec::new();

    let required_text = [
        ("contrato", "El contrato", &fields.contrato),
        ("cliente", "El cliente", &fields.cliente),
        ("region", "La región", &fields.region),
        ("ciudad", "La ciudad", &fields.ciudad),
    ];
    for (field, label, value) in required_text {
        if value.trim().chars().count() < MIN_TEXT_LEN {
            errors.push(ValidationError::TooShort { field, label });
        }
    }

    if fields.estado.parse::<Estado>().is_err() {
        errors.push(ValidationError::InvalidEstado(fields.estado.clone()));
    }

    if fields.monto < 0.0 {
        errors.push(ValidationError::NegativeMonto(fields.monto));
    }
    if fields.monto > rules.monto_max {
        errors.push(ValidationError::MontoTooLarge(fields.monto));
    }

    if let Some(inicio) = fields.fecha_inicio {
        if inicio > today {
            errors.push(ValidationError::FutureStartDate(inicio));
        }
    }

    if let (Some(inicio), Some(termino)) = (fields.fecha_inicio, fields.fecha_termino) {
        if termino < inicio {
            errors.push(ValidationError::EndBeforeStart { inicio, termino });
        }
    }

    Validation { errors }
}
