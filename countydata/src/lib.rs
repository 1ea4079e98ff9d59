//! # countydata
//!
//! Jointure de jeux de données de référence américains (limites de comtés,
//! statistiques économiques et énergétiques, ensoleillement, sites de solaire
//! communautaire, villes) en un seul document JSON indexé par nom d'état.
//!
//! ## Étapes
//!
//! - Lecture des six fichiers (GeoJSON + CSV), décodage Latin-1 ou UTF-8
//! - Normalisation des identifiants d'état (FIPS, abréviation -> nom)
//! - Jointures comtés/statistiques/ensoleillement et sites/villes
//! - Regroupement par état: `{"California": [[comtés...], [sites...]], ...}`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use countydata::{prepare, write_aggregate, InputPaths, PrepareOptions};
//! use std::path::Path;
//!
//! let inputs = InputPaths::in_dir(Path::new("Data"));
//! let result = prepare(&inputs, &PrepareOptions::default())?;
//! write_aggregate(&result.aggregate, Path::new("details_by_state.json"))?;
//! ```

pub mod aggregate;
pub mod error;
pub mod join;
pub mod keys;
pub mod normalize;
pub mod output;
pub mod reader;
pub mod types;

pub use aggregate::{StateAggregate, StateDetails};
pub use error::{CountyDataError, StateKeyKind};
pub use join::{JoinStats, SitePolicy};
pub use keys::{CountyFips, StateFips, StateIndex};
pub use output::write_aggregate;
pub use reader::TextEncoding;
pub use types::{CountyFeature, PrepareResult, SiteRecord, StateMatch};

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

/// Noms de fichiers par défaut dans le répertoire de données
pub const BOUNDARIES_FILE: &str = "gz_2010_us_050_00_5m.json";
pub const COUNTY_STATS_FILE: &str = "county_vars_full_hsiang.csv";
pub const SUNLIGHT_FILE: &str = "NLDAS_sunlight.csv";
pub const STATES_FILE: &str = "state_fips.csv";
pub const SITES_FILE: &str = "sharing_the_sun.csv";
pub const CITIES_FILE: &str = "uscities.csv";

/// Fichier de sortie par défaut
pub const OUTPUT_FILE: &str = "details_by_state.json";

/// Chemins et encodages des six fichiers d'entrée
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub boundaries: PathBuf,
    pub county_stats: PathBuf,
    pub sunlight: PathBuf,
    pub states: PathBuf,
    pub sites: PathBuf,
    pub cities: PathBuf,

    /// Encodage de la collection GeoJSON
    pub boundaries_encoding: TextEncoding,
    /// Encodage du fichier des sites
    pub sites_encoding: TextEncoding,
    /// Encodage des autres tables
    pub table_encoding: TextEncoding,
}

impl InputPaths {
    /// Noms de fichiers historiques dans `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            boundaries: dir.join(BOUNDARIES_FILE),
            county_stats: dir.join(COUNTY_STATS_FILE),
            sunlight: dir.join(SUNLIGHT_FILE),
            states: dir.join(STATES_FILE),
            sites: dir.join(SITES_FILE),
            cities: dir.join(CITIES_FILE),
            boundaries_encoding: TextEncoding::Latin1,
            sites_encoding: TextEncoding::Latin1,
            table_encoding: TextEncoding::Whatwg(encoding_rs::UTF_8),
        }
    }

    pub fn all(&self) -> [&Path; 6] {
        [
            self.boundaries.as_path(),
            self.county_stats.as_path(),
            self.sunlight.as_path(),
            self.states.as_path(),
            self.sites.as_path(),
            self.cities.as_path(),
        ]
    }
}

/// Options de préparation
#[derive(Debug, Clone, Copy, Default)]
pub struct PrepareOptions {
    pub site_policy: SitePolicy,
}

/// Vérifie que tous les fichiers d'entrée existent
///
/// # Errors
///
/// `MissingInputFile` pour le premier fichier absent.
pub fn check_inputs(inputs: &InputPaths) -> Result<(), CountyDataError> {
    let missing: Vec<&Path> = inputs.all().into_iter().filter(|p| !p.is_file()).collect();
    for path in &missing {
        warn!(file = %path.display(), "Input file not found");
    }
    match missing.first() {
        Some(path) => Err(CountyDataError::MissingInputFile(path.to_path_buf())),
        None => Ok(()),
    }
}

/// Exécute toute la préparation et retourne l'agrégat par état.
///
/// Les lignes malformées et les clés inconnues des jointures d'enrichissement
/// sont collectées dans `diagnostics` sans interrompre le traitement.
///
/// # Errors
///
/// Retourne `CountyDataError` si un fichier manque ou est illisible, si une
/// colonne obligatoire est absente, ou si un comté référence un code d'état
/// inconnu.
pub fn prepare(
    inputs: &InputPaths,
    options: &PrepareOptions,
) -> Result<PrepareResult, CountyDataError> {
    // 1. Tous les fichiers doivent être présents avant de commencer
    check_inputs(inputs)?;

    let mut diagnostics = Vec::new();
    let mut stats = JoinStats::default();

    // 2. Table de référence des états
    let states = reader::tables::load_states(&inputs.states, inputs.table_encoding, &mut diagnostics)?;
    let index = StateIndex::new(states);
    debug!(states = index.len(), "State reference loaded");

    // 3. Limites de comtés: STATE -> nom, COUNTY -> FIPS complet
    let collection = reader::boundaries::load(&inputs.boundaries, inputs.boundaries_encoding)?;
    let counties = normalize::rewrite_counties(
        &reader::file_label(&inputs.boundaries),
        collection.features,
        &index,
        &mut diagnostics,
    )?;

    // 4. Statistiques + ensoleillement
    let sunlight =
        reader::tables::load_sunlight(&inputs.sunlight, inputs.table_encoding, &mut diagnostics)?;
    let records = reader::tables::load_county_stats(
        &inputs.county_stats,
        inputs.table_encoding,
        &mut diagnostics,
    )?;
    let rows = normalize::resolve_stats_states(records, &index, &mut diagnostics);
    let county_stats = join::attach_sunlight(rows, &sunlight, &mut stats);
    let counties = join::enrich_counties(counties, &county_stats, &mut stats);

    // 5. Sites + villes
    let site_rows =
        reader::tables::load_sites(&inputs.sites, inputs.sites_encoding, &mut diagnostics)?;
    let sites = normalize::resolve_site_states(site_rows, &index, &mut diagnostics);
    let cities =
        reader::tables::load_cities(&inputs.cities, inputs.table_encoding, &mut diagnostics)?;
    let sites = join::attach_cities(sites, &cities, options.site_policy, &mut stats);

    // 6. Regroupement par état
    let aggregate = StateAggregate::build(&index, counties, sites);

    if !diagnostics.is_empty() {
        warn!(count = diagnostics.len(), "Records skipped or left unresolved");
    }
    info!(
        states = aggregate.len(),
        counties = aggregate.county_count(),
        sites = aggregate.site_count(),
        "Aggregate built"
    );

    Ok(PrepareResult {
        aggregate,
        stats,
        diagnostics,
    })
}
