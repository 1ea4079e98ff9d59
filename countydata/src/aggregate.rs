//! Regroupement des comtés et des sites par état

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::keys::StateIndex;
use crate::types::{CountyFeature, SiteRecord};

/// Entrée d'un état: sérialisée en `[comtés, sites]`
#[derive(Debug, Clone, Default)]
pub struct StateDetails {
    pub counties: Vec<CountyFeature>,
    pub sites: Vec<SiteRecord>,
}

impl Serialize for StateDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.counties, &self.sites).serialize(serializer)
    }
}

/// Nom d'état -> `[comtés, sites]`, dans l'ordre de la table de référence
#[derive(Debug, Clone, Default)]
pub struct StateAggregate {
    entries: Vec<(String, StateDetails)>,
    positions: HashMap<String, usize>,
}

impl StateAggregate {
    /// Une entrée vide par état connu
    pub fn for_states(index: &StateIndex) -> Self {
        let mut aggregate = Self::default();
        for name in index.names() {
            if aggregate.positions.contains_key(name) {
                continue;
            }
            aggregate
                .positions
                .insert(name.to_string(), aggregate.entries.len());
            aggregate
                .entries
                .push((name.to_string(), StateDetails::default()));
        }
        aggregate
    }

    /// Regroupe comtés puis sites, en conservant l'ordre d'entrée
    pub fn build(
        index: &StateIndex,
        counties: Vec<CountyFeature>,
        sites: Vec<SiteRecord>,
    ) -> Self {
        let mut aggregate = Self::for_states(index);
        for county in counties {
            aggregate.push_county(county);
        }
        for site in sites {
            aggregate.push_site(site);
        }
        aggregate
    }

    /// Renvoie false si l'état du comté est inconnu
    pub fn push_county(&mut self, county: CountyFeature) -> bool {
        match self.get_mut(&county.state) {
            Some(details) => {
                details.counties.push(county);
                true
            }
            None => false,
        }
    }

    /// Renvoie false si l'état du site est inconnu
    pub fn push_site(&mut self, site: SiteRecord) -> bool {
        match self.get_mut(&site.state) {
            Some(details) => {
                details.sites.push(site);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, state: &str) -> Option<&StateDetails> {
        self.positions.get(state).map(|&i| &self.entries[i].1)
    }

    fn get_mut(&mut self, state: &str) -> Option<&mut StateDetails> {
        let i = *self.positions.get(state)?;
        Some(&mut self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateDetails)> {
        self.entries.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn county_count(&self) -> usize {
        self.entries.iter().map(|(_, d)| d.counties.len()).sum()
    }

    pub fn site_count(&self) -> usize {
        self.entries.iter().map(|(_, d)| d.sites.len()).sum()
    }
}

impl Serialize for StateAggregate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, details) in &self.entries {
            map.serialize_entry(name, details)?;
        }
        map.end()
    }
}
