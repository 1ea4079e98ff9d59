//! Types d'erreurs pour le crate countydata

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Nature d'une clé d'état inconnue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKeyKind {
    /// Code FIPS d'état (2 chiffres)
    Fips,
    /// Abréviation postale (ex: "CA")
    Abbreviation,
}

impl fmt::Display for StateKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKeyKind::Fips => f.write_str("state FIPS code"),
            StateKeyKind::Abbreviation => f.write_str("state abbreviation"),
        }
    }
}

/// Erreurs pouvant survenir lors de la préparation des données
#[derive(Debug, Error)]
pub enum CountyDataError {
    /// Erreur d'I/O lors de la lecture d'un fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fichier d'entrée absent
    #[error("Missing input file: {}", .0.display())]
    MissingInputFile(PathBuf),

    /// Clé d'état absente de la table de référence
    #[error("Unknown {kind}: {key}")]
    UnknownStateKey { kind: StateKeyKind, key: String },

    /// Ligne sans clé de jointure exploitable
    #[error("Malformed record in {file} (line {line}): {reason}")]
    MalformedRecord {
        file: String,
        line: u64,
        reason: String,
    },

    /// Colonne obligatoire absente de l'en-tête
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Erreur du lecteur CSV
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// Collection GeoJSON illisible
    #[error("Invalid GeoJSON in {file}: {reason}")]
    GeoJson { file: String, reason: String },

    /// Encodage non reconnu
    #[error("Unsupported encoding: {0}")]
    Encoding(String),

    /// Échec d'écriture du fichier de sortie
    #[error("Failed to write {}: {reason}", .path.display())]
    SerializationFailure { path: PathBuf, reason: String },
}

impl CountyDataError {
    /// Crée une erreur de ligne malformée avec contexte
    pub fn malformed(file: impl Into<String>, line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Crée une erreur de clé d'état inconnue
    pub fn unknown_state(kind: StateKeyKind, key: impl Into<String>) -> Self {
        Self::UnknownStateKey {
            kind,
            key: key.into(),
        }
    }

    pub fn csv(file: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            file: file.into(),
            source,
        }
    }

    /// Vrai pour les erreurs qu'on peut compter puis ignorer
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedRecord { .. } | Self::UnknownStateKey { .. }
        )
    }
}
