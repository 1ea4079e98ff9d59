//! Normalisation des identifiants d'état et de comté

use geojson::Feature;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::keys::{CountyFips, StateFips, StateIndex};
use crate::reader::tables::{SiteRow, StatsRecord};
use crate::types::{CountyFeature, CountyStatsRow, SiteRecord};
use crate::CountyDataError;

/// Réécrit STATE (nom d'état) et COUNTY (FIPS sur 5 chiffres) de chaque comté
///
/// Un code d'état inconnu est fatal: sans nom d'état, le comté ne peut pas
/// être regroupé. Une feature sans STATE/COUNTY exploitable est ignorée.
pub fn rewrite_counties(
    file: &str,
    features: Vec<Feature>,
    index: &StateIndex,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<CountyFeature>, CountyDataError> {
    let mut counties = Vec::with_capacity(features.len());

    for (i, mut feature) in features.into_iter().enumerate() {
        // Position 1-based dans la collection
        let position = i as u64 + 1;

        let Some(state_fips) = feature.property("STATE").and_then(state_code) else {
            diagnostics.push(CountyDataError::malformed(file, position, "invalid STATE property"));
            continue;
        };
        let Some(fips) = feature
            .property("COUNTY")
            .and_then(county_code)
            .and_then(|county| CountyFips::from_parts(state_fips, &county))
        else {
            diagnostics.push(CountyDataError::malformed(file, position, "invalid COUNTY property"));
            continue;
        };

        let state = index.name_for_fips(state_fips)?.to_string();

        feature.set_property("STATE", state.clone());
        feature.set_property("COUNTY", fips.as_str());

        counties.push(CountyFeature {
            state,
            fips,
            feature,
        });
    }

    debug!(counties = counties.len(), "County boundaries normalized");
    Ok(counties)
}

/// STATE peut être "06" ou 6
fn state_code(value: &JsonValue) -> Option<StateFips> {
    match value {
        JsonValue::String(s) => StateFips::parse(s),
        JsonValue::Number(n) => n.as_u64().and_then(|n| StateFips::new(u32::try_from(n).ok()?)),
        _ => None,
    }
}

/// COUNTY peut être "001" ou 1
fn county_code(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => n.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}

/// Vérifie l'abréviation d'état des statistiques
///
/// Une abréviation inconnue n'est pas fatale: la jointure se fait sur le code
/// FIPS seul, la ligne reste utilisable.
pub fn resolve_stats_states(
    records: Vec<StatsRecord>,
    index: &StateIndex,
    diagnostics: &mut Vec<CountyDataError>,
) -> Vec<CountyStatsRow> {
    records
        .into_iter()
        .map(|record| {
            if let Err(e) = index.name_for_abbreviation(&record.abbreviation) {
                diagnostics.push(e);
            }
            CountyStatsRow {
                county_fips: record.county_fips,
                income: record.income,
                energy_expenditure: record.energy_expenditure,
                damages_pct: record.damages_pct,
            }
        })
        .collect()
}

/// Résout l'abréviation d'état des sites; un site sans état connu est écarté
pub fn resolve_site_states(
    rows: Vec<SiteRow>,
    index: &StateIndex,
    diagnostics: &mut Vec<CountyDataError>,
) -> Vec<SiteRecord> {
    let mut sites = Vec::with_capacity(rows.len());

    for mut row in rows {
        let state = match index.name_for_abbreviation(&row.abbreviation) {
            Ok(name) => name.to_string(),
            Err(e) => {
                diagnostics.push(e);
                continue;
            }
        };

        row.fields
            .insert("State".to_string(), JsonValue::String(state.clone()));
        sites.push(SiteRecord {
            city: row.city,
            state,
            fields: row.fields,
        });
    }

    sites
}
