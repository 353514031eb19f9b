//! CSV reading and writing
//!
//! Reading turns a CSV document into [`RawRow`]s for the import pipeline.
//! The delimiter (comma, semicolon or tab) is detected from the header
//! line, since spreadsheets in Spanish locales save with `;`.
//!
//! Writing renders stored projects with a chosen column list and value
//! formats; headers are the field labels.

use std::io::{Read, Write};
use std::str::FromStr;

use chrono::NaiveDate;

use super::{Cell, RawRow};
use crate::model::{field_spec, FieldKind, FieldSpec, Project, ProjectFields, FIELDS};
use crate::{Error, Result};

const BOM: char = '\u{feff}';

/// Pick the separator that appears most in the header line
///
/// Ties go to the comma.
pub fn detect_delimiter(first_line: &str) -> u8 {
    let commas = first_line.matches(',').count();
    let semicolons = first_line.matches(';').count();
    let tabs = first_line.matches('\t').count();

    if semicolons > commas && semicolons >= tabs {
        b';'
    } else if tabs > commas && tabs > semicolons {
        b'\t'
    } else {
        b','
    }
}

/// Read every data row of a CSV document
pub fn read_rows<R: Read>(mut reader: R) -> Result<Vec<RawRow>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    read_rows_from_str(&content)
}

/// Read every data row of a CSV document held in memory
///
/// Cells are trimmed. Rows where every cell is empty are skipped. Short
/// rows are padded with empty cells so each row carries every header.
pub fn read_rows_from_str(content: &str) -> Result<Vec<RawRow>> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cell = record.get(i).map(Cell::from).unwrap_or(Cell::Null);
                (header.to_string(), cell)
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// How booleans are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BooleanFormat {
    /// `Sí` / `No`
    #[default]
    SiNo,
    TrueFalse,
    OneZero,
    /// `✓` / `✗`
    CheckX,
}

impl BooleanFormat {
    pub fn render(self, value: bool) -> &'static str {
        match (self, value) {
            (BooleanFormat::SiNo, true) => "Sí",
            (BooleanFormat::SiNo, false) => "No",
            (BooleanFormat::TrueFalse, true) => "true",
            (BooleanFormat::TrueFalse, false) => "false",
            (BooleanFormat::OneZero, true) => "1",
            (BooleanFormat::OneZero, false) => "0",
            (BooleanFormat::CheckX, true) => "✓",
            (BooleanFormat::CheckX, false) => "✗",
        }
    }
}

impl FromStr for BooleanFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "si-no" => Ok(BooleanFormat::SiNo),
            "true-false" => Ok(BooleanFormat::TrueFalse),
            "1-0" => Ok(BooleanFormat::OneZero),
            "check-x" => Ok(BooleanFormat::CheckX),
            other => Err(Error::InvalidInput(format!("Formato booleano desconocido: {}", other))),
        }
    }
}

/// How dates are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFormat {
    #[default]
    DayMonthYear,
    MonthDayYear,
    Iso,
    DayMonthYearSlash,
    MonthDayYearSlash,
}

impl DateFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "%d-%m-%Y",
            DateFormat::MonthDayYear => "%m-%d-%Y",
            DateFormat::Iso => "%Y-%m-%d",
            DateFormat::DayMonthYearSlash => "%d/%m/%Y",
            DateFormat::MonthDayYearSlash => "%m/%d/%Y",
        }
    }

    pub fn render(self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }
}

impl FromStr for DateFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dd-mm-yyyy" => Ok(DateFormat::DayMonthYear),
            "mm-dd-yyyy" => Ok(DateFormat::MonthDayYear),
            "yyyy-mm-dd" => Ok(DateFormat::Iso),
            "dd/mm/yyyy" => Ok(DateFormat::DayMonthYearSlash),
            "mm/dd/yyyy" => Ok(DateFormat::MonthDayYearSlash),
            other => Err(Error::InvalidInput(format!("Formato de fecha desconocido: {}", other))),
        }
    }
}

/// Column selection and value formats for an export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub fields: Vec<&'static FieldSpec>,
    pub boolean_format: BooleanFormat,
    pub date_format: DateFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fields: FIELDS.iter().collect(),
            boolean_format: BooleanFormat::default(),
            date_format: DateFormat::default(),
        }
    }
}

impl ExportOptions {
    /// Restrict the export to `keys`, in the given order
    ///
    /// An empty list keeps every field. Unknown keys are an error.
    pub fn with_fields<S: AsRef<str>>(mut self, keys: &[S]) -> Result<Self> {
        if keys.is_empty() {
            return Ok(self);
        }

        self.fields = keys
            .iter()
            .map(|key| {
                let key = key.as_ref().trim();
                field_spec(key).ok_or_else(|| Error::InvalidInput(format!("Campo desconocido: {}", key)))
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }
}

/// Write `projects` as CSV; returns the number of data rows written
pub fn write_projects<W: Write>(
    writer: W,
    projects: &[Project],
    options: &ExportOptions,
) -> Result<usize> {
    let mut wtr = ::csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(options.fields.iter().map(|f| f.label))?;

    for project in projects {
        wtr.write_record(
            options
                .fields
                .iter()
                .map(|spec| render_field(&project.fields, spec, options)),
        )?;
    }

    wtr.flush()?;
    Ok(projects.len())
}

fn render_field(fields: &ProjectFields, spec: &FieldSpec, options: &ExportOptions) -> String {
    match spec.kind {
        FieldKind::Boolean => options
            .boolean_format
            .render(boolean_value(fields, spec.key))
            .to_string(),
        FieldKind::Date => date_value(fields, spec.key)
            .map(|d| options.date_format.render(d))
            .unwrap_or_default(),
        FieldKind::Integer => integer_value(fields, spec.key)
            .map(|n| n.to_string())
            .unwrap_or_default(),
        FieldKind::Decimal => decimal_value(fields, spec.key)
            .map(format_decimal)
            .unwrap_or_default(),
        FieldKind::Text | FieldKind::Estado => text_value(fields, spec.key).to_string(),
    }
}

/// Whole amounts are written without a fractional part (`700000`, not `700000.0`)
fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn boolean_value(f: &ProjectFields, key: &str) -> bool {
    match key {
        "ems" => f.ems,
        "estudio_sismico" => f.estudio_sismico,
        "estudio_geoelectrico" => f.estudio_geoelectrico,
        "topografia" => f.topografia,
        "sondaje" => f.sondaje,
        "hidraulica_hidrologia" => f.hidraulica_hidrologia,
        "certificado_experiencia" => f.certificado_experiencia,
        "orden_compra" => f.orden_compra,
        "contrato_doc" => f.contrato_doc,
        "factura" => f.factura,
        _ => false,
    }
}

fn date_value(f: &ProjectFields, key: &str) -> Option<NaiveDate> {
    match key {
        "fecha_inicio" => f.fecha_inicio,
        "fecha_termino" => f.fecha_termino,
        "fecha_factura" => f.fecha_factura,
        _ => None,
    }
}

fn integer_value(f: &ProjectFields, key: &str) -> Option<i64> {
    match key {
        "id" => f.id,
        "duracion" => f.duracion,
        _ => None,
    }
}

fn decimal_value(f: &ProjectFields, key: &str) -> Option<f64> {
    match key {
        "monto" => Some(f.monto),
        "superficie_terreno" => f.superficie_terreno,
        "superficie_construida" => f.superficie_construida,
        _ => None,
    }
}

fn text_value<'a>(f: &'a ProjectFields, key: &str) -> &'a str {
    match key {
        "contrato" => &f.contrato,
        "cliente" => &f.cliente,
        "region" => &f.region,
        "ciudad" => &f.ciudad,
        "estado" => &f.estado,
        "rut_cliente" => &f.rut_cliente,
        "tipo_cliente" => &f.tipo_cliente,
        "persona_contacto" => &f.persona_contacto,
        "telefono_contacto" => &f.telefono_contacto,
        "correo_contacto" => &f.correo_contacto,
        "tipo_obra_lista" => &f.tipo_obra_lista,
        "descripcion" => &f.descripcion,
        "numero_factura" => &f.numero_factura,
        "numero_orden_compra" => &f.numero_orden_compra,
        "link_documentos" => &f.link_documentos,
        _ => "",
    }
}
