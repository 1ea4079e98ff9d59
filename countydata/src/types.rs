//! Types de données pour le crate countydata

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::aggregate::StateAggregate;
use crate::join::JoinStats;
use crate::keys::{CountyFips, StateFips};
use crate::CountyDataError;

/// Champs copiés depuis les statistiques vers les propriétés d'un comté
pub const INCOME_FIELD: &str = "County_Income2012";
pub const ENERGY_FIELD: &str = "Energy_expenditure";
pub const DAMAGES_FIELD: &str = "Total_damages_pct";
pub const SUNLIGHT_FIELD: &str = "Avg_Daily_Sunlight_kJ";

/// Valeur sentinelle pour "pas de donnée"
pub const NO_DATA: f64 = -1.0;

/// Une ligne de la table de référence des états
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMatch {
    pub fips_code: StateFips,
    pub abbreviation: String,
    pub name: String,
}

/// Un comté avec sa géométrie, STATE et COUNTY déjà réécrits
#[derive(Debug, Clone)]
pub struct CountyFeature {
    /// Nom complet de l'état
    pub state: String,

    /// Code FIPS complet (5 chiffres)
    pub fips: CountyFips,

    /// Feature GeoJSON d'origine, propriétés modifiées en place
    pub feature: geojson::Feature,
}

impl CountyFeature {
    pub fn is_enriched(&self) -> bool {
        self.feature.contains_property(SUNLIGHT_FIELD)
    }
}

impl Serialize for CountyFeature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.feature.serialize(serializer)
    }
}

/// Ligne brute de statistiques par comté (avant fusion avec l'ensoleillement)
#[derive(Debug, Clone, PartialEq)]
pub struct CountyStatsRow {
    pub county_fips: CountyFips,
    pub income: Option<f64>,
    pub energy_expenditure: Option<f64>,
    pub damages_pct: Option<f64>,
}

/// Statistiques d'un comté après fusion, valeurs manquantes remplacées par -1
#[derive(Debug, Clone, PartialEq)]
pub struct CountyStats {
    pub county_fips: CountyFips,
    pub income: f64,
    pub energy_expenditure: f64,
    pub damages_pct: f64,
    pub avg_daily_sunlight_kj: f64,
}

/// Ensoleillement moyen d'un comté
#[derive(Debug, Clone, PartialEq)]
pub struct SunlightRow {
    pub county_fips: CountyFips,
    pub avg_daily_sunlight_kj: Option<f64>,
}

/// Métadonnées d'une ville
#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub city: String,
    pub state_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub population: Value,
    pub density: Value,
}

/// Un site de solaire communautaire: toutes les colonnes du fichier source
///
/// `City` et `State` sont conservés dans `fields`; `State` contient le nom
/// complet de l'état une fois normalisé.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecord {
    pub city: String,
    pub state: String,
    pub fields: Map<String, Value>,
}

impl SiteRecord {
    /// Vrai si aucune cellule n'est manquante
    pub fn is_complete(&self) -> bool {
        self.fields.values().all(|v| !v.is_null())
    }

    pub fn has_coordinates(&self) -> bool {
        ["Latitude", "Longitude"]
            .iter()
            .all(|k| self.fields.get(*k).is_some_and(Value::is_number))
    }
}

impl Serialize for SiteRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Résultat complet d'une préparation
#[derive(Debug)]
pub struct PrepareResult {
    /// Agrégat par état, prêt à sérialiser
    pub aggregate: StateAggregate,

    /// Compteurs des jointures
    pub stats: JoinStats,

    /// Erreurs non fatales (lignes ignorées, clés inconnues)
    pub diagnostics: Vec<CountyDataError>,
}
