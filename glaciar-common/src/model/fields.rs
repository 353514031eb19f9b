//! Canonical field table
//!
//! Every project attribute has one canonical key (the persisted column name
//! and the JSON property), a human label used for CSV export headers, and a
//! coercion kind used by the import pipeline.

/// How a raw cell is coerced into a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Optional integer (`id`, `duracion`)
    Integer,
    /// Decimal (`monto`, surfaces)
    Decimal,
    /// Optional calendar date
    Date,
    /// Boolean checkbox
    Boolean,
    /// Trimmed free text, default empty
    Text,
    /// Status enumeration, default `Activo`
    Estado,
}

/// Static description of one canonical field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { key, label, kind }
}

/// All canonical fields in export order
pub const FIELDS: &[FieldSpec] = &[
    field("id", "ID del Proyecto", FieldKind::Integer),
    field("contrato", "Contrato", FieldKind::Text),
    field("cliente", "Cliente", FieldKind::Text),
    field("fecha_inicio", "Fecha de Inicio", FieldKind::Date),
    field("fecha_termino", "Fecha de Término", FieldKind::Date),
    field("duracion", "Duración (días)", FieldKind::Integer),
    field("region", "Región", FieldKind::Text),
    field("ciudad", "Ciudad", FieldKind::Text),
    field("estado", "Estado", FieldKind::Estado),
    field("monto", "Monto", FieldKind::Decimal),
    field("rut_cliente", "RUT Cliente", FieldKind::Text),
    field("tipo_cliente", "Tipo de Cliente", FieldKind::Text),
    field("persona_contacto", "Persona de Contacto", FieldKind::Text),
    field("telefono_contacto", "Teléfono de Contacto", FieldKind::Text),
    field("correo_contacto", "Correo de Contacto", FieldKind::Text),
    field("superficie_terreno", "Superficie de Terreno", FieldKind::Decimal),
    field("superficie_construida", "Superficie Construida", FieldKind::Decimal),
    field("tipo_obra_lista", "Tipo de Obra", FieldKind::Text),
    field("ems", "EMS", FieldKind::Boolean),
    field("estudio_sismico", "Estudio Sísmico", FieldKind::Boolean),
    field("estudio_geoelectrico", "Estudio Geoeléctrico", FieldKind::Boolean),
    field("topografia", "Topografía", FieldKind::Boolean),
    field("sondaje", "Sondaje", FieldKind::Boolean),
    field("hidraulica_hidrologia", "Hidráulica/Hidrología", FieldKind::Boolean),
    field("descripcion", "Descripción", FieldKind::Text),
    field("certificado_experiencia", "Certificado de Experiencia", FieldKind::Boolean),
    field("orden_compra", "Orden de Compra", FieldKind::Boolean),
    field("contrato_doc", "Contrato Documento", FieldKind::Boolean),
    field("factura", "Factura", FieldKind::Boolean),
    field("fecha_factura", "Fecha de Factura", FieldKind::Date),
    field("numero_factura", "Número de Factura", FieldKind::Text),
    field("numero_orden_compra", "Número de Orden de Compra", FieldKind::Text),
    field("link_documentos", "Link de Documentos", FieldKind::Text),
];

/// Look up a canonical field by key
pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}
