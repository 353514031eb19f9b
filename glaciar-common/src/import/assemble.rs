//! Record assembly: canonical row → project candidate
//!
//! Every known field present in the row is coerced with its default;
//! fields absent from the row keep their current value. Unknown columns
//! are ignored.

use std::fmt;

use super::coerce::{coerce_bool, coerce_numeric, is_blank, parse_date_cell, DateCell, Number};
use super::{CanonicalRow, Cell};
use crate::model::{Estado, ProjectFields};

/// Kind of non-fatal coercion problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    InvalidDate,
    InvalidNumber,
}

/// A cell that could not be coerced and was replaced by its default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    pub field: &'static str,
    pub value: String,
    pub kind: WarningKind,
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::InvalidDate => {
                write!(f, "No se pudo interpretar la fecha '{}' en {}", self.value, self.field)
            }
            WarningKind::InvalidNumber => {
                write!(f, "No se pudo interpretar el número '{}' en {}", self.value, self.field)
            }
        }
    }
}

/// Candidate plus the warnings raised while building it
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub fields: ProjectFields,
    pub warnings: Vec<ImportWarning>,
}

/// Build a fresh candidate from a canonical row
pub fn assemble(row: &CanonicalRow) -> Assembled {
    let mut fields = ProjectFields::default();
    let warnings = apply_row(&mut fields, row);
    Assembled { fields, warnings }
}

/// Overwrite the fields present in `row`, leaving the others untouched
///
/// Used for creation (on a default candidate) and for partial updates
/// (on the stored record).
pub fn apply_row(fields: &mut ProjectFields, row: &CanonicalRow) -> Vec<ImportWarning> {
    let mut warnings = Vec::new();
    for (key, cell) in row {
        apply_cell(fields, key, cell, &mut warnings);
    }
    warnings
}

fn apply_cell(fields: &mut ProjectFields, key: &str, cell: &Cell, warnings: &mut Vec<ImportWarning>) {
    let mut ctx = Coercer { cell, warnings };
    match key {
        "id" => fields.id = ctx.integer("id"),
        "contrato" => fields.contrato = ctx.text(),
        "cliente" => fields.cliente = ctx.text(),
        "fecha_inicio" => fields.fecha_inicio = ctx.date("fecha_inicio"),
        "fecha_termino" => fields.fecha_termino = ctx.date("fecha_termino"),
        "duracion" => fields.duracion = ctx.integer("duracion"),
        "region" => fields.region = ctx.text(),
        "ciudad" => fields.ciudad = ctx.text(),
        "estado" => fields.estado = ctx.estado(),
        "monto" => {
            fields.monto = ctx
                .number("monto", Some(Number::Int(0)))
                .map_or(0.0, Number::as_f64)
        }
        "rut_cliente" => fields.rut_cliente = ctx.text(),
        "tipo_cliente" => fields.tipo_cliente = ctx.text(),
        "persona_contacto" => fields.persona_contacto = ctx.text(),
        "telefono_contacto" => fields.telefono_contacto = ctx.text(),
        "correo_contacto" => fields.correo_contacto = ctx.text(),
        "superficie_terreno" => fields.superficie_terreno = ctx.decimal("superficie_terreno"),
        "superficie_construida" => {
            fields.superficie_construida = ctx.decimal("superficie_construida")
        }
        "tipo_obra_lista" => fields.tipo_obra_lista = ctx.text(),
        "ems" => fields.ems = ctx.boolean(),
        "estudio_sismico" => fields.estudio_sismico = ctx.boolean(),
        "estudio_geoelectrico" => fields.estudio_geoelectrico = ctx.boolean(),
        "topografia" => fields.topografia = ctx.boolean(),
        "sondaje" => fields.sondaje = ctx.boolean(),
        "hidraulica_hidrologia" => fields.hidraulica_hidrologia = ctx.boolean(),
        "descripcion" => fields.descripcion = ctx.text(),
        "certificado_experiencia" => fields.certificado_experiencia = ctx.boolean(),
        "orden_compra" => fields.orden_compra = ctx.boolean(),
        "contrato_doc" => fields.contrato_doc = ctx.boolean(),
        "factura" => fields.factura = ctx.boolean(),
        "fecha_factura" => fields.fecha_factura = ctx.date("fecha_factura"),
        "numero_factura" => fields.numero_factura = ctx.text(),
        "numero_orden_compra" => fields.numero_orden_compra = ctx.text(),
        "link_documentos" => fields.link_documentos = ctx.text(),
        _ => {}
    }
}

/// Coerces one cell, recording warnings for values that had to be dropped
struct Coercer<'a> {
    cell: &'a Cell,
    warnings: &'a mut Vec<ImportWarning>,
}

impl Coercer<'_> {
    fn text(&mut self) -> String {
        self.cell.as_text().trim().to_string()
    }

    fn boolean(&mut self) -> bool {
        coerce_bool(self.cell)
    }

    fn estado(&mut self) -> String {
        let raw = self.cell.as_text();
        if is_blank(&raw) {
            Estado::default().as_str().to_string()
        } else {
            raw.trim().to_string()
        }
    }

    fn number(&mut self, field: &'static str, default: Option<Number>) -> Option<Number> {
        let cell = self.cell;
        let raw = cell.as_text();
        let parsed = coerce_numeric(&raw, None);
        if parsed.is_none() && !is_blank(&raw) {
            self.warn(field, &raw, WarningKind::InvalidNumber);
        }
        parsed.or(default)
    }

    fn integer(&mut self, field: &'static str) -> Option<i64> {
        self.number(field, None).map(Number::as_i64)
    }

    fn decimal(&mut self, field: &'static str) -> Option<f64> {
        self.number(field, None).map(Number::as_f64)
    }

    fn date(&mut self, field: &'static str) -> Option<chrono::NaiveDate> {
        let cell = self.cell;
        let raw = cell.as_text();
        match parse_date_cell(&raw) {
            DateCell::Date(date) => Some(date),
            DateCell::Empty => None,
            DateCell::Invalid => {
                self.warn(field, &raw, WarningKind::InvalidDate);
                None
            }
        }
    }

    fn warn(&mut self, field: &'static str, value: &str, kind: WarningKind) {
        self.warnings.push(ImportWarning {
            field,
            value: value.to_string(),
            kind,
        });
    }
}
