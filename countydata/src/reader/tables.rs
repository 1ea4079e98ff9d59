//! Lecture des tables CSV (états, statistiques, ensoleillement, sites, villes)

use std::path::Path;

use serde_json::{Map, Value};

use super::{cell, number, ColumnType, Table, TextEncoding};
use crate::keys::{CountyFips, StateFips};
use crate::types::{
    CityRecord, StateMatch, SunlightRow, DAMAGES_FIELD, ENERGY_FIELD, INCOME_FIELD,
    SUNLIGHT_FIELD,
};
use crate::CountyDataError;

/// Ligne de statistiques avant résolution de l'état
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRecord {
    pub abbreviation: String,
    pub county_fips: CountyFips,
    pub income: Option<f64>,
    pub energy_expenditure: Option<f64>,
    pub damages_pct: Option<f64>,
}

/// Ligne de site avant résolution de l'état
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRow {
    pub city: String,
    pub abbreviation: String,
    /// Toutes les colonnes, dans l'ordre du fichier
    pub fields: Map<String, Value>,
}

/// Table de référence: STATE, STUSAB, STATE_NAME
pub fn load_states(
    path: &Path,
    encoding: TextEncoding,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<StateMatch>, CountyDataError> {
    let table = Table::read(path, encoding, diagnostics)?;
    states_from_table(&table, diagnostics)
}

pub fn states_from_table(
    table: &Table,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<StateMatch>, CountyDataError> {
    let fips_col = table.column("STATE")?;
    let abbr_col = table.column("STUSAB")?;
    let name_col = table.column("STATE_NAME")?;

    let mut states = Vec::with_capacity(table.rows.len());
    for record in &table.rows {
        let Some(fips_code) = cell(record, fips_col).and_then(StateFips::parse) else {
            diagnostics.push(table.malformed(record, "invalid STATE code"));
            continue;
        };
        let (Some(abbreviation), Some(name)) = (cell(record, abbr_col), cell(record, name_col))
        else {
            diagnostics.push(table.malformed(record, "missing STUSAB or STATE_NAME"));
            continue;
        };

        states.push(StateMatch {
            fips_code,
            abbreviation: abbreviation.to_string(),
            name: name.to_string(),
        });
    }

    Ok(states)
}

/// Statistiques par comté: State, County_FIPS et les trois variables économiques
pub fn load_county_stats(
    path: &Path,
    encoding: TextEncoding,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<StatsRecord>, CountyDataError> {
    let table = Table::read(path, encoding, diagnostics)?;
    county_stats_from_table(&table, diagnostics)
}

pub fn county_stats_from_table(
    table: &Table,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<StatsRecord>, CountyDataError> {
    let state_col = table.column("State")?;
    let fips_col = table.column("County_FIPS")?;
    let income_col = table.column(INCOME_FIELD)?;
    let energy_col = table.column(ENERGY_FIELD)?;
    let damages_col = table.column(DAMAGES_FIELD)?;

    let mut rows = Vec::with_capacity(table.rows.len());
    for record in &table.rows {
        let Some(county_fips) = cell(record, fips_col).and_then(CountyFips::parse) else {
            diagnostics.push(table.malformed(record, "invalid County_FIPS"));
            continue;
        };
        let Some(abbreviation) = cell(record, state_col) else {
            diagnostics.push(table.malformed(record, "missing State"));
            continue;
        };

        rows.push(StatsRecord {
            abbreviation: abbreviation.to_string(),
            county_fips,
            income: number(record, income_col),
            energy_expenditure: number(record, energy_col),
            damages_pct: number(record, damages_col),
        });
    }

    Ok(rows)
}

/// Ensoleillement moyen: County_FIPS, Avg_Daily_Sunlight_kJ
pub fn load_sunlight(
    path: &Path,
    encoding: TextEncoding,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<SunlightRow>, CountyDataError> {
    let table = Table::read(path, encoding, diagnostics)?;
    sunlight_from_table(&table, diagnostics)
}

pub fn sunlight_from_table(
    table: &Table,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<SunlightRow>, CountyDataError> {
    let fips_col = table.column("County_FIPS")?;
    let sunlight_col = table.column(SUNLIGHT_FIELD)?;

    let mut rows = Vec::with_capacity(table.rows.len());
    for record in &table.rows {
        let Some(county_fips) = cell(record, fips_col).and_then(CountyFips::parse) else {
            diagnostics.push(table.malformed(record, "invalid County_FIPS"));
            continue;
        };

        rows.push(SunlightRow {
            county_fips,
            avg_daily_sunlight_kj: number(record, sunlight_col),
        });
    }

    Ok(rows)
}

/// Sites de solaire communautaire: toutes les colonnes sont conservées
pub fn load_sites(
    path: &Path,
    encoding: TextEncoding,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<SiteRow>, CountyDataError> {
    let table = Table::read(path, encoding, diagnostics)?;
    sites_from_table(&table, diagnostics)
}

pub fn sites_from_table(
    table: &Table,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<SiteRow>, CountyDataError> {
    let city_col = table.column("City")?;
    let state_col = table.column("State")?;

    // Un type par colonne, calculé avant d'écarter quoi que ce soit
    let types: Vec<ColumnType> = (0..table.headers.len())
        .map(|i| {
            if i == city_col || i == state_col {
                ColumnType::Text
            } else {
                table.column_type(i)
            }
        })
        .collect();

    let mut rows = Vec::with_capacity(table.rows.len());
    for record in &table.rows {
        let (Some(city), Some(abbreviation)) = (cell(record, city_col), cell(record, state_col))
        else {
            diagnostics.push(table.malformed(record, "missing City or State"));
            continue;
        };

        let mut fields = Map::new();
        for ((i, header), kind) in table.headers.iter().enumerate().zip(&types) {
            fields.insert(header.to_string(), kind.value(cell(record, i)));
        }

        rows.push(SiteRow {
            city: city.to_string(),
            abbreviation: abbreviation.to_string(),
            fields,
        });
    }

    Ok(rows)
}

/// Métadonnées des villes: city, state_name, lat, lng, population, density
pub fn load_cities(
    path: &Path,
    encoding: TextEncoding,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<CityRecord>, CountyDataError> {
    let table = Table::read(path, encoding, diagnostics)?;
    cities_from_table(&table, diagnostics)
}

pub fn cities_from_table(
    table: &Table,
    diagnostics: &mut Vec<CountyDataError>,
) -> Result<Vec<CityRecord>, CountyDataError> {
    let city_col = table.column("city")?;
    let state_col = table.column("state_name")?;
    let lat_col = table.column("lat")?;
    let lng_col = table.column("lng")?;
    let population_col = table.column("population")?;
    let density_col = table.column("density")?;
    let population_type = table.column_type(population_col);
    let density_type = table.column_type(density_col);

    let mut cities = Vec::with_capacity(table.rows.len());
    for record in &table.rows {
        let (Some(city), Some(state_name)) = (cell(record, city_col), cell(record, state_col))
        else {
            diagnostics.push(table.malformed(record, "missing city or state_name"));
            continue;
        };

        cities.push(CityRecord {
            city: city.to_string(),
            state_name: state_name.to_string(),
            latitude: number(record, lat_col),
            longitude: number(record, lng_col),
            population: population_type.value(cell(record, population_col)),
            density: density_type.value(cell(record, density_col)),
        });
    }

    Ok(cities)
}
