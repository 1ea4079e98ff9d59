//! Clés de jointure typées et table de correspondance des états
//!
//! Les codes FIPS sont normalisés une seule fois au chargement: un comté est
//! toujours identifié par une chaîne de 5 chiffres (état sur 2, comté sur 3).

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{CountyDataError, StateKeyKind};
use crate::types::StateMatch;

/// Code FIPS d'un état (0..=99)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateFips(u8);

impl StateFips {
    pub fn new(code: u32) -> Option<Self> {
        (code <= 99).then_some(Self(code as u8))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Parse "6", "06", "06.0"
    pub fn parse(raw: &str) -> Option<Self> {
        parse_code(raw).and_then(Self::new)
    }
}

impl fmt::Display for StateFips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Code FIPS d'un comté: exactement 5 chiffres ASCII
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CountyFips(String);

impl CountyFips {
    /// Concatène l'état et le code comté (1 à 3 chiffres, complété à 3)
    pub fn from_parts(state: StateFips, county: &str) -> Option<Self> {
        let county = county.trim();
        if county.is_empty() || county.len() > 3 || !county.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(format!("{}{:0>3}", state, county)))
    }

    /// Code numérique complet (ex: 6001 -> "06001")
    pub fn from_code(code: u32) -> Option<Self> {
        (code <= 99_999).then(|| Self(format!("{:05}", code)))
    }

    /// Parse une cellule FIPS ("6001", "06001", "6001.0")
    pub fn parse(raw: &str) -> Option<Self> {
        parse_code(raw).and_then(Self::from_code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountyFips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse un entier positif, éventuellement écrit comme flottant sans partie décimale
fn parse_code(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok();
    }
    let value: f64 = fast_float::parse(raw).ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

/// Correspondances code FIPS / abréviation -> nom d'état
///
/// En cas de doublon dans la table de référence, la première ligne l'emporte.
#[derive(Debug, Clone, Default)]
pub struct StateIndex {
    states: Vec<StateMatch>,
    by_fips: HashMap<StateFips, usize>,
    by_abbreviation: HashMap<String, usize>,
}

impl StateIndex {
    pub fn new(states: Vec<StateMatch>) -> Self {
        let mut by_fips = HashMap::with_capacity(states.len());
        let mut by_abbreviation = HashMap::with_capacity(states.len());

        for (i, state) in states.iter().enumerate() {
            by_fips.entry(state.fips_code).or_insert(i);
            by_abbreviation
                .entry(state.abbreviation.clone())
                .or_insert(i);
        }

        Self {
            states,
            by_fips,
            by_abbreviation,
        }
    }

    pub fn name_for_fips(&self, fips: StateFips) -> Result<&str, CountyDataError> {
        self.by_fips
            .get(&fips)
            .map(|&i| self.states[i].name.as_str())
            .ok_or_else(|| CountyDataError::unknown_state(StateKeyKind::Fips, fips.to_string()))
    }

    pub fn name_for_abbreviation(&self, abbreviation: &str) -> Result<&str, CountyDataError> {
        self.by_abbreviation
            .get(abbreviation.trim())
            .map(|&i| self.states[i].name.as_str())
            .ok_or_else(|| {
                CountyDataError::unknown_state(StateKeyKind::Abbreviation, abbreviation.trim())
            })
    }

    /// Noms d'états dans l'ordre de la table de référence (doublons inclus)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
