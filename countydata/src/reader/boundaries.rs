//! Lecture de la collection GeoJSON des limites de comtés

use std::path::Path;

use geojson::FeatureCollection;

use super::{file_label, read_decoded, TextEncoding};
use crate::CountyDataError;

/// Charge la FeatureCollection (fichier du Census en Latin-1)
pub fn load(path: &Path, encoding: TextEncoding) -> Result<FeatureCollection, CountyDataError> {
    let content = read_decoded(path, encoding)?;
    parse(&file_label(path), &content)
}

pub fn parse(file: &str, content: &str) -> Result<FeatureCollection, CountyDataError> {
    content
        .parse::<FeatureCollection>()
        .map_err(|e| CountyDataError::GeoJson {
            file: file.to_string(),
            reason: e.to_string(),
        })
}
