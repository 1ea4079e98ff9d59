//! Écriture du document JSON final

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::aggregate::StateAggregate;
use crate::CountyDataError;

/// Écrit l'agrégat dans `path` (fichier écrasé s'il existe)
pub fn write_aggregate(aggregate: &StateAggregate, path: &Path) -> Result<(), CountyDataError> {
    let failure = |reason: String| CountyDataError::SerializationFailure {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::create(path).map_err(|e| failure(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    write_to(aggregate, &mut writer).map_err(|e| failure(e.to_string()))?;
    writer.flush().map_err(|e| failure(e.to_string()))?;

    debug!(path = %path.display(), states = aggregate.len(), "Aggregate written");
    Ok(())
}

/// Sérialise l'agrégat (JSON compact) dans un writer quelconque
pub fn write_to<W: Write>(aggregate: &StateAggregate, writer: W) -> Result<(), serde_json::Error> {
    serde_json::to_writer(writer, aggregate)
}
