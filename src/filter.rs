//! Category filters over the pivoted overdose table
//!
//! A category key is a drug name, a race, or a place of death. The
//! sentinel `Everything` means no restriction. Restrictions combine with AND.

use crate::data::{OverdoseRecord, OverdoseTable};
use serde::Serialize;
use thiserror::Error;

/// Category key meaning "no filter"
pub const EVERYTHING: &str = "Everything";

/// Sex categories kept by the demographics chart
pub const SEXES: [&str; 2] = ["Male", "Female"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown drug '{0}': no such column in the overdose table")]
    UnknownDrug(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub drug: Option<String>,
    pub race: Option<String>,
    pub place: Option<String>,
}

impl Filter {
    pub fn everything() -> Self {
        Self::default()
    }

    /// Filter on a drug key; `Everything` leaves the drug unrestricted
    pub fn drug(key: &str) -> Self {
        Self {
            drug: category(key),
            ..Self::default()
        }
    }

    pub fn with_race(mut self, key: &str) -> Self {
        self.race = category(key);
        self
    }

    pub fn with_place(mut self, key: &str) -> Self {
        self.place = category(key);
        self
    }

    pub fn is_everything(&self) -> bool {
        self.drug.is_none() && self.race.is_none() && self.place.is_none()
    }

    /// Human label used in chart titles, e.g. "Heroin" or "Everything (White, Hospital)"
    pub fn label(&self) -> String {
        let base = self.drug.as_deref().unwrap_or(EVERYTHING);
        let extra: Vec<&str> = [self.race.as_deref(), self.place.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if extra.is_empty() {
            base.to_string()
        } else {
            format!("{} ({})", base, extra.join(", "))
        }
    }
}

fn category(key: &str) -> Option<String> {
    let key = key.trim();
    (!key.is_empty() && key != EVERYTHING).then(|| key.to_string())
}

impl OverdoseTable {
    /// Rows matching every restriction in `filter`.
    /// An unrestricted filter returns the full record set.
    pub fn select(&self, filter: &Filter) -> Result<Vec<&OverdoseRecord>, FilterError> {
        let drug_index = match &filter.drug {
            Some(drug) => Some(
                self.drug_index(drug)
                    .ok_or_else(|| FilterError::UnknownDrug(drug.clone()))?,
            ),
            None => None,
        };

        Ok(self
            .records()
            .iter()
            .filter(|r| drug_index.is_none_or(|i| r.involves(i)))
            .filter(|r| filter.race.as_deref().is_none_or(|race| r.race == race))
            .filter(|r| filter.place.as_deref().is_none_or(|place| r.place == place))
            .collect())
    }
}
