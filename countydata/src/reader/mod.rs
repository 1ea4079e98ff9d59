//! Lecture des fichiers d'entrée
//!
//! Tous les fichiers sont décodés en mémoire avec `encoding_rs` avant d'être
//! passés au lecteur CSV ou au parser GeoJSON.

pub mod boundaries;
pub mod tables;

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::Encoding;
use serde_json::{Number, Value};

use crate::CountyDataError;

/// Cellules considérées comme manquantes (mêmes marqueurs qu'un dataframe)
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Labels désignant le vrai ISO-8859-1 (WHATWG les confond avec windows-1252)
const LATIN1_LABELS: &[&str] = &["latin1", "latin-1", "l1", "iso-8859-1", "iso8859-1", "iso_8859-1"];

/// Encodage d'un fichier d'entrée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// ISO-8859-1 strict: chaque octet est le point de code de même valeur
    Latin1,
    /// Encodage WHATWG d'encoding_rs
    Whatwg(&'static Encoding),
}

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Whatwg(encoding) => encoding.name(),
        }
    }

    /// Décode `bytes`; un BOM éventuel l'emporte sur l'encodage configuré
    ///
    /// Retourne le texte, le nom de l'encodage utilisé et la présence de
    /// séquences invalides.
    pub fn decode(self, bytes: &[u8]) -> (Cow<'_, str>, &'static str, bool) {
        if let Some((bom, len)) = Encoding::for_bom(bytes) {
            let (text, had_errors) = bom.decode_without_bom_handling(&bytes[len..]);
            return (text, bom.name(), had_errors);
        }
        match self {
            TextEncoding::Latin1 => (encoding_rs::mem::decode_latin1(bytes), self.name(), false),
            TextEncoding::Whatwg(encoding) => {
                let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
                (text, encoding.name(), had_errors)
            }
        }
    }
}

impl From<&'static Encoding> for TextEncoding {
    fn from(encoding: &'static Encoding) -> Self {
        TextEncoding::Whatwg(encoding)
    }
}

/// Lit un fichier et le décode (un BOM éventuel l'emporte sur l'encodage donné)
pub fn read_decoded(path: &Path, encoding: TextEncoding) -> Result<String, CountyDataError> {
    let bytes = std::fs::read(path)?;
    let (decoded, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        tracing::warn!(
            file = %path.display(),
            encoding = used,
            "Input contains invalid sequences, replaced with U+FFFD"
        );
    }
    Ok(decoded.into_owned())
}

/// Résout un label d'encodage ("utf-8", "latin1", "iso-8859-1", ...)
pub fn encoding_for_label(label: &str) -> Result<TextEncoding, CountyDataError> {
    let label = label.trim();
    if LATIN1_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label)) {
        return Ok(TextEncoding::Latin1);
    }
    Encoding::for_label(label.as_bytes())
        .map(TextEncoding::Whatwg)
        .ok_or_else(|| CountyDataError::Encoding(label.to_string()))
}

/// Table CSV décodée, avec en-têtes
#[derive(Debug)]
pub struct Table {
    /// Nom du fichier (pour les messages)
    pub file: String,
    pub headers: csv::StringRecord,
    pub rows: Vec<csv::StringRecord>,
}

impl Table {
    /// Lit une table CSV; les lignes illisibles sont renvoyées comme diagnostics
    pub fn read(
        path: &Path,
        encoding: TextEncoding,
        diagnostics: &mut Vec<CountyDataError>,
    ) -> Result<Self, CountyDataError> {
        let file = file_label(path);
        let content = read_decoded(path, encoding)?;
        Self::parse(&file, &content, diagnostics)
    }

    pub fn parse(
        file: &str,
        content: &str,
        diagnostics: &mut Vec<CountyDataError>,
    ) -> Result<Self, CountyDataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| CountyDataError::csv(file, e))?
            .iter()
            .map(str::trim)
            .collect::<csv::StringRecord>();

        let mut rows = Vec::new();
        for record in reader.records() {
            match record {
                Ok(record) => rows.push(record),
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    diagnostics.push(CountyDataError::malformed(file, line, e.to_string()));
                }
            }
        }

        Ok(Self {
            file: file.to_string(),
            headers,
            rows,
        })
    }

    /// Index d'une colonne obligatoire
    pub fn column(&self, name: &str) -> Result<usize, CountyDataError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CountyDataError::MissingColumn {
                file: self.file.clone(),
                column: name.to_string(),
            })
    }

    /// Type de la colonne `index`, calculé sur toutes les lignes
    pub fn column_type(&self, index: usize) -> ColumnType {
        ColumnType::infer(self.rows.iter().map(|record| cell(record, index)))
    }

    /// Erreur de ligne malformée positionnée sur `record`
    pub fn malformed(&self, record: &csv::StringRecord, reason: impl Into<String>) -> CountyDataError {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        CountyDataError::malformed(&self.file, line, reason)
    }
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Cellule non vide et non marquée comme manquante
pub fn cell(record: &csv::StringRecord, index: usize) -> Option<&str> {
    let value = record.get(index)?.trim();
    (!NA_VALUES.contains(&value)).then_some(value)
}

/// Valeur numérique d'une cellule (None si manquante ou non numérique)
pub fn number(record: &csv::StringRecord, index: usize) -> Option<f64> {
    finite_float(cell(record, index)?)
}

fn finite_float(raw: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(raw).ok().filter(|f| f.is_finite())
}

/// Type d'une colonne, comme un dataframe le déduit à la lecture
///
/// Une seule cellule manquante suffit à passer une colonne entière en
/// flottants; une seule cellule non numérique la passe en texte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    pub fn infer<'a>(cells: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let mut kind = ColumnType::Integer;
        for cell in cells {
            match cell {
                None => kind = ColumnType::Float,
                Some(raw) if kind == ColumnType::Integer && raw.parse::<i64>().is_ok() => {}
                Some(raw) if finite_float(raw).is_some() => kind = ColumnType::Float,
                Some(_) => return ColumnType::Text,
            }
        }
        kind
    }

    /// Valeur JSON d'une cellule de ce type; manquante -> null
    pub fn value(self, raw: Option<&str>) -> Value {
        let Some(raw) = raw else {
            return Value::Null;
        };
        let typed = match self {
            ColumnType::Integer => raw.parse::<i64>().ok().map(Value::from),
            ColumnType::Float => finite_float(raw)
                .and_then(Number::from_f64)
                .map(Value::Number),
            ColumnType::Text => None,
        };
        typed.unwrap_or_else(|| Value::String(raw.to_string()))
    }
}
