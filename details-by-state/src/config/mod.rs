//! Configuration de la préparation

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use countydata::{InputPaths, PrepareOptions, SitePolicy};

/// Répertoire de données par défaut
pub const DEFAULT_DATA_DIR: &str = "Data";

/// Variables d'environnement prises en compte
pub const ENV_DATA_DIR: &str = "COUNTYDATA_DIR";
pub const ENV_OUTPUT: &str = "COUNTYDATA_OUTPUT";

/// Configuration principale (fichier JSON, tous les champs optionnels)
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Répertoire contenant les six fichiers d'entrée
    pub data_dir: Option<PathBuf>,

    /// Fichier JSON de sortie
    pub output: Option<PathBuf>,

    /// Chemins explicites, prioritaires sur `data_dir`
    pub files: FileOverrides,

    /// Labels d'encodage (WHATWG: "utf-8", "latin1", ...)
    pub encodings: EncodingConfig,

    /// Conserver les sites dont une cellule est vide
    pub keep_incomplete_sites: bool,
}

/// Chemins individuels des fichiers d'entrée
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileOverrides {
    pub boundaries: Option<PathBuf>,
    pub county_stats: Option<PathBuf>,
    pub sunlight: Option<PathBuf>,
    pub states: Option<PathBuf>,
    pub sites: Option<PathBuf>,
    pub cities: Option<PathBuf>,
}

/// Encodages des fichiers d'entrée
#[derive(Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    pub boundaries: String,
    pub sites: String,
    pub tables: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            boundaries: "latin1".to_string(),
            sites: "latin1".to_string(),
            tables: "utf-8".to_string(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Chemins d'entrée: `data_dir` puis surcharges fichier par fichier
    pub fn input_paths(&self, data_dir: &Path) -> Result<InputPaths> {
        let mut inputs = InputPaths::in_dir(data_dir);

        let files = &self.files;
        let overrides = [
            (&mut inputs.boundaries, &files.boundaries),
            (&mut inputs.county_stats, &files.county_stats),
            (&mut inputs.sunlight, &files.sunlight),
            (&mut inputs.states, &files.states),
            (&mut inputs.sites, &files.sites),
            (&mut inputs.cities, &files.cities),
        ];
        for (target, value) in overrides {
            if let Some(path) = value {
                *target = path.clone();
            }
        }

        inputs.boundaries_encoding = countydata::reader::encoding_for_label(&self.encodings.boundaries)
            .context("Invalid boundaries encoding")?;
        inputs.sites_encoding = countydata::reader::encoding_for_label(&self.encodings.sites)
            .context("Invalid sites encoding")?;
        inputs.table_encoding = countydata::reader::encoding_for_label(&self.encodings.tables)
            .context("Invalid tables encoding")?;

        Ok(inputs)
    }

    pub fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            site_policy: if self.keep_incomplete_sites {
                SitePolicy::KeepIncomplete
            } else {
                SitePolicy::DropIncomplete
            },
        }
    }
}

/// Paramètres résolus pour une exécution
#[derive(Debug, Clone)]
pub struct Settings {
    pub inputs: InputPaths,
    pub output: PathBuf,
    pub options: PrepareOptions,
}

/// Surcharges venant de la ligne de commande
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub keep_incomplete_sites: bool,
}

impl Settings {
    /// Priorité: ligne de commande, puis environnement, puis fichier, puis défauts
    pub fn resolve(config: &Config, overrides: Overrides) -> Result<Self> {
        Self::resolve_with_env(config, overrides, |key| std::env::var_os(key))
    }

    /// Comme `resolve`, avec une lecture d'environnement fournie par l'appelant
    pub fn resolve_with_env(
        config: &Config,
        overrides: Overrides,
        env: impl Fn(&str) -> Option<OsString>,
    ) -> Result<Self> {
        let data_dir = overrides
            .data_dir
            .or_else(|| env(ENV_DATA_DIR).map(PathBuf::from))
            .or_else(|| config.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let output = overrides
            .output
            .or_else(|| env(ENV_OUTPUT).map(PathBuf::from))
            .or_else(|| config.output.clone())
            .unwrap_or_else(|| PathBuf::from(countydata::OUTPUT_FILE));

        let mut options = config.prepare_options();
        if overrides.keep_incomplete_sites {
            options.site_policy = SitePolicy::KeepIncomplete;
        }

        Ok(Self {
            inputs: config.input_paths(&data_dir)?,
            output,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        let inputs = config.input_paths(Path::new("Data")).unwrap();

        assert_eq!(inputs.boundaries, Path::new("Data/gz_2010_us_050_00_5m.json"));
        assert_eq!(inputs.sites_encoding.name(), "ISO-8859-1");
        assert_eq!(config.prepare_options().site_policy, SitePolicy::DropIncomplete);
    }

    #[test]
    fn test_file_overrides_and_encodings() {
        let config: Config = serde_json::from_str(
            r#"{
                "files": {"cities": "/tmp/cities_2023.csv"},
                "encodings": {"sites": "utf-8"},
                "keep_incomplete_sites": true
            }"#,
        )
        .unwrap();
        let inputs = config.input_paths(Path::new("Data")).unwrap();

        assert_eq!(inputs.cities, Path::new("/tmp/cities_2023.csv"));
        assert_eq!(inputs.states, Path::new("Data/state_fips.csv"));
        assert_eq!(inputs.sites_encoding.name(), "UTF-8");
        assert_eq!(inputs.boundaries_encoding.name(), "ISO-8859-1");
        assert_eq!(config.prepare_options().site_policy, SitePolicy::KeepIncomplete);
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let config: Config =
            serde_json::from_str(r#"{"encodings": {"tables": "ebcdic-klingon"}}"#).unwrap();
        assert!(config.input_paths(Path::new("Data")).is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{"data_directory": "x"}"#).is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let config: Config =
            serde_json::from_str(r#"{"data_dir": "from-config", "output": "cfg.json"}"#).unwrap();
        let settings = Settings::resolve(
            &config,
            Overrides {
                data_dir: Some(PathBuf::from("from-cli")),
                output: Some(PathBuf::from("cli.json")),
                keep_incomplete_sites: true,
            },
        )
        .unwrap();

        assert_eq!(settings.inputs.states, Path::new("from-cli/state_fips.csv"));
        assert_eq!(settings.output, Path::new("cli.json"));
        assert_eq!(settings.options.site_policy, SitePolicy::KeepIncomplete);
    }

    #[test]
    fn test_env_wins_over_config_file() {
        let config: Config =
            serde_json::from_str(r#"{"data_dir": "from-config", "output": "cfg.json"}"#).unwrap();
        let env = |key: &str| match key {
            ENV_DATA_DIR => Some(OsString::from("from-env")),
            ENV_OUTPUT => Some(OsString::from("env.json")),
            _ => None,
        };
        let settings = Settings::resolve_with_env(&config, Overrides::default(), env).unwrap();

        assert_eq!(settings.inputs.states, Path::new("from-env/state_fips.csv"));
        assert_eq!(settings.output, Path::new("env.json"));
        assert_eq!(settings.options.site_policy, SitePolicy::DropIncomplete);
    }

    #[test]
    fn test_cli_wins_over_env() {
        let env = |key: &str| (key == ENV_OUTPUT).then(|| OsString::from("env.json"));
        let settings = Settings::resolve_with_env(
            &Config::default(),
            Overrides {
                output: Some(PathBuf::from("cli.json")),
                ..Default::default()
            },
            env,
        )
        .unwrap();

        assert_eq!(settings.output, Path::new("cli.json"));
        assert_eq!(settings.inputs.states, Path::new("Data/state_fips.csv"));
    }

    #[test]
    fn test_config_file_then_defaults() {
        let config: Config = serde_json::from_str(r#"{"output": "cfg.json"}"#).unwrap();
        let settings = Settings::resolve_with_env(&config, Overrides::default(), |_| None).unwrap();

        assert_eq!(settings.output, Path::new("cfg.json"));
        assert_eq!(settings.inputs.states, Path::new("Data/state_fips.csv"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/config.json")).is_err());
    }
}
