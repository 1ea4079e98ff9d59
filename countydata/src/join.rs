//! Jointures entre tables
//!
//! Toutes les jointures supposent au plus une ligne par clé. En cas de
//! doublon, la première ligne rencontrée (ordre du fichier) l'emporte.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Number, Value};
use tracing::debug;

use crate::keys::CountyFips;
use crate::types::{
    CityRecord, CountyFeature, CountyStats, CountyStatsRow, SiteRecord, SunlightRow,
    DAMAGES_FIELD, ENERGY_FIELD, INCOME_FIELD, NO_DATA, SUNLIGHT_FIELD,
};

/// Traitement des sites dont une cellule reste vide après la jointure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SitePolicy {
    /// Écarte toute ligne incomplète (comportement historique)
    #[default]
    DropIncomplete,
    /// N'écarte que les sites sans ville correspondante
    KeepIncomplete,
}

/// Compteurs des jointures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    /// Lignes de statistiques sans ensoleillement (-1)
    pub stats_without_sunlight: usize,
    /// Comtés enrichis avec les statistiques
    pub counties_enriched: usize,
    /// Comtés sans statistiques correspondantes
    pub counties_without_stats: usize,
    /// Sites conservés
    pub sites_kept: usize,
    /// Sites sans ville correspondante
    pub sites_unmatched: usize,
    /// Sites écartés pour cellule manquante
    pub sites_incomplete: usize,
}

/// Index première-occurrence sur une clé
fn first_by_key<'a, T, K, F>(rows: &'a [T], key: F) -> HashMap<K, &'a T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&'a T) -> K,
{
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        index.entry(key(row)).or_insert(row);
    }
    index
}

/// Jointure gauche statistiques -> ensoleillement sur le FIPS du comté
///
/// Toute valeur manquante (ensoleillement compris) devient -1.
pub fn attach_sunlight(
    rows: Vec<CountyStatsRow>,
    sunlight: &[SunlightRow],
    stats: &mut JoinStats,
) -> Vec<CountyStats> {
    let by_fips = first_by_key(sunlight, |s| &s.county_fips);

    rows.into_iter()
        .map(|row| {
            let sun = by_fips
                .get(&row.county_fips)
                .and_then(|s| s.avg_daily_sunlight_kj);
            if sun.is_none() {
                stats.stats_without_sunlight += 1;
            }

            CountyStats {
                county_fips: row.county_fips,
                income: row.income.unwrap_or(NO_DATA),
                energy_expenditure: row.energy_expenditure.unwrap_or(NO_DATA),
                damages_pct: row.damages_pct.unwrap_or(NO_DATA),
                avg_daily_sunlight_kj: sun.unwrap_or(NO_DATA),
            }
        })
        .collect()
}

/// Copie les quatre variables sur les propriétés des comtés correspondants
///
/// Un comté sans statistiques reste tel quel.
pub fn enrich_counties(
    mut counties: Vec<CountyFeature>,
    county_stats: &[CountyStats],
    stats: &mut JoinStats,
) -> Vec<CountyFeature> {
    let by_fips: HashMap<&CountyFips, &CountyStats> =
        first_by_key(county_stats, |s| &s.county_fips);

    for county in &mut counties {
        let Some(row) = by_fips.get(&county.fips) else {
            stats.counties_without_stats += 1;
            continue;
        };

        county.feature.set_property(INCOME_FIELD, row.income);
        county
            .feature
            .set_property(ENERGY_FIELD, row.energy_expenditure);
        county.feature.set_property(DAMAGES_FIELD, row.damages_pct);
        county
            .feature
            .set_property(SUNLIGHT_FIELD, row.avg_daily_sunlight_kj);
        stats.counties_enriched += 1;
    }

    debug!(
        enriched = stats.counties_enriched,
        without_stats = stats.counties_without_stats,
        "Counties enriched"
    );
    counties
}

/// Jointure sites -> villes sur (City, nom d'état)
///
/// Les sites sans ville sont écartés; selon `policy`, les sites avec une
/// cellule vide aussi. Une ville sans coordonnées ne compte pas comme
/// correspondance.
pub fn attach_cities(
    sites: Vec<SiteRecord>,
    cities: &[CityRecord],
    policy: SitePolicy,
    stats: &mut JoinStats,
) -> Vec<SiteRecord> {
    let mut by_key: HashMap<(&str, &str), &CityRecord> = HashMap::with_capacity(cities.len());
    for city in cities {
        if city.latitude.is_none() || city.longitude.is_none() {
            continue;
        }
        by_key
            .entry((city.city.as_str(), city.state_name.as_str()))
            .or_insert(city);
    }

    let mut kept = Vec::with_capacity(sites.len());
    for mut site in sites {
        let Some(city) = by_key.get(&(site.city.as_str(), site.state.as_str())) else {
            stats.sites_unmatched += 1;
            continue;
        };

        site.fields
            .insert("Latitude".to_string(), coordinate(city.latitude));
        site.fields
            .insert("Longitude".to_string(), coordinate(city.longitude));
        site.fields
            .insert("city_population".to_string(), city.population.clone());
        site.fields
            .insert("city_density".to_string(), city.density.clone());

        if policy == SitePolicy::DropIncomplete && !site.is_complete() {
            stats.sites_incomplete += 1;
            continue;
        }

        kept.push(site);
    }

    stats.sites_kept = kept.len();
    debug!(
        kept = stats.sites_kept,
        unmatched = stats.sites_unmatched,
        incomplete = stats.sites_incomplete,
        "Sites matched to cities"
    );
    kept
}

fn coordinate(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
