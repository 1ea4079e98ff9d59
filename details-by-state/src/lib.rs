//! # details-by-state
//!
//! Prépare le fichier statique `details_by_state.json` consommé par la
//! visualisation: comtés enrichis et sites de solaire communautaire, par état.
//!
//! ## Usage CLI
//!
//! ```bash
//! # Fichiers dans ./Data, sortie dans ./details_by_state.json
//! details-by-state
//!
//! # Autre répertoire, rapport JSON
//! details-by-state --data-dir ./inputs --output ./web/details_by_state.json --report run.json
//!
//! # Configuration JSON (chemins, encodages)
//! details-by-state --config prepare.json
//! ```

pub mod config;
pub mod report;

pub use config::{Config, Overrides, Settings};
pub use report::{RunReport, RunStatus};
