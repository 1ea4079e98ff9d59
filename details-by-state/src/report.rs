//! Rapport d'exécution
//!
//! Collecte les compteurs de la préparation, les lignes ignorées et
//! l'empreinte du fichier produit (deux exécutions sur les mêmes entrées
//! doivent donner la même empreinte).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use countydata::{CountyDataError, JoinStats, PrepareResult};

/// Statut global de l'exécution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Aucune ligne ignorée
    Success,
    /// Sortie écrite, avec des lignes ignorées ou non résolues
    PartialSuccess,
}

/// Ligne ignorée ou clé non résolue
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Fichier source (si connu)
    pub file: Option<String>,
    /// Ligne dans le fichier (si connue)
    pub line: Option<u64>,
    /// Message d'erreur
    pub message: String,
}

impl From<&CountyDataError> for Diagnostic {
    fn from(error: &CountyDataError) -> Self {
        match error {
            CountyDataError::MalformedRecord { file, line, reason } => Self {
                file: Some(file.clone()),
                line: Some(*line),
                message: reason.clone(),
            },
            other => Self {
                file: None,
                line: None,
                message: other.to_string(),
            },
        }
    }
}

/// Rapport complet d'une exécution
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Fichier produit
    pub output: String,
    /// Durée de l'exécution
    pub duration_secs: f64,
    /// Statut global
    pub status: RunStatus,

    /// Nombre d'états dans l'agrégat
    pub states: usize,
    /// Nombre de comtés regroupés
    pub counties: usize,
    /// Nombre de sites regroupés
    pub sites: usize,

    /// Compteurs des jointures
    pub joins: JoinStats,

    /// Empreinte blake3 du fichier produit
    pub checksum: Option<String>,

    /// Lignes ignorées et clés non résolues
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    /// Construit le rapport depuis le résultat de la préparation
    pub fn new(output: &Path, result: &PrepareResult) -> Self {
        let mut report = Self {
            output: output.display().to_string(),
            duration_secs: 0.0,
            status: RunStatus::Success,
            states: result.aggregate.len(),
            counties: result.aggregate.county_count(),
            sites: result.aggregate.site_count(),
            joins: result.stats.clone(),
            checksum: None,
            diagnostics: result.diagnostics.iter().map(Diagnostic::from).collect(),
        };
        report.finalize();
        report
    }

    /// Définit la durée de l'exécution
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Calcule l'empreinte du fichier produit
    pub fn record_checksum(&mut self, path: &Path) -> Result<()> {
        self.checksum = Some(compute_file_checksum(path)?);
        Ok(())
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.diagnostics.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::PartialSuccess
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("DETAILS BY STATE - {}", self.output);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        if let Some(ref checksum) = self.checksum {
            println!("Checksum (blake3): {}", checksum);
        }

        println!("\n--- SUMMARY ---");
        println!(
            "States: {}, counties: {}, sites: {}",
            self.states, self.counties, self.sites
        );
        println!(
            "Counties: {} enriched, {} without statistics ({} statistics rows without sunlight)",
            self.joins.counties_enriched,
            self.joins.counties_without_stats,
            self.joins.stats_without_sunlight
        );
        println!(
            "Sites: {} kept, {} without city match, {} incomplete",
            self.joins.sites_kept, self.joins.sites_unmatched, self.joins.sites_incomplete
        );

        if !self.diagnostics.is_empty() {
            println!("\n--- SKIPPED ({}) ---", self.diagnostics.len());
            for d in self.diagnostics.iter().take(20) {
                let location = match (&d.file, d.line) {
                    (Some(f), Some(l)) => format!("[{}:{}]", f, l),
                    (Some(f), None) => format!("[{}]", f),
                    _ => String::new(),
                };
                println!("  {} {}", location, d.message);
            }
            if self.diagnostics.len() > 20 {
                println!("  ... and {} more", self.diagnostics.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} states, {} counties, {} sites, {} skipped",
            self.output,
            self.states,
            self.counties,
            self.sites,
            self.diagnostics.len()
        )
    }
}

/// Calcule le checksum blake3 d'un fichier
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    use std::fs::File;
    use std::io::Read;

    let mut file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 65536];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
