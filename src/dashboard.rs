//! Loaded dashboard state
//!
//! Everything the page, the bindings and the server read from. Built once at
//! startup and shared read-only afterwards.

use crate::chart::{make_demographics, make_race, ChartError, ChartSpec, Theme};
use crate::config::{Config, ConfigError};
use crate::data::{missing_drug_columns, DataError, DescriptionTable, OverdoseTable};
use crate::filter::Filter;
use crate::lookup::LookupError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("default drug '{0}' is not in the description table")]
    UnknownDefault(String),
    #[error("cannot render initial {output}: {message}")]
    InitialOutput {
        output: &'static str,
        message: String,
    },
    #[error("failed to format page")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub struct Dashboard {
    descriptions: DescriptionTable,
    overdoses: OverdoseTable,
    combination_chart: Option<String>,
    default_drug: String,
    theme: Theme,
}

impl Dashboard {
    /// Load both tables and the combination chart named by `config`.
    /// Any missing or malformed input is an error.
    pub fn load(config: &Config) -> Result<Self> {
        let descriptions = DescriptionTable::load(
            &config.resolve(&config.data.descriptions),
            config.descriptions_sheet(),
        )?;
        let overdoses = OverdoseTable::load(&config.resolve(&config.data.overdoses), &config.columns)?;

        let combination_chart = match config.combination_chart_path() {
            Some(path) => Some(
                std::fs::read_to_string(&path).map_err(|source| Error::Io { path, source })?,
            ),
            None => None,
        };

        let dashboard = Self::new(descriptions, overdoses)
            .with_default_drug(&config.dashboard.default_drug)?
            .with_combination_chart(combination_chart);

        for key in dashboard.missing_drug_columns() {
            tracing::warn!(drug = %key, "described drug has no column in the overdose table");
        }

        Ok(dashboard)
    }

    /// Defaults to the first described drug and no combination chart
    pub fn new(descriptions: DescriptionTable, overdoses: OverdoseTable) -> Self {
        let default_drug = descriptions.keys().next().unwrap_or_default().to_string();
        Self {
            descriptions,
            overdoses,
            combination_chart: None,
            default_drug,
            theme: Theme::default(),
        }
    }

    pub fn with_default_drug(mut self, drug: &str) -> Result<Self> {
        if self.descriptions.get(drug).is_none() {
            return Err(Error::UnknownDefault(drug.to_string()));
        }
        self.default_drug = drug.to_string();
        Ok(self)
    }

    pub fn with_combination_chart(mut self, document: Option<String>) -> Self {
        self.combination_chart = document;
        self
    }

    pub fn descriptions(&self) -> &DescriptionTable {
        &self.descriptions
    }

    pub fn overdoses(&self) -> &OverdoseTable {
        &self.overdoses
    }

    /// Pre-rendered chart document, embedded verbatim
    pub fn combination_chart(&self) -> Option<&str> {
        self.combination_chart.as_deref()
    }

    pub fn default_drug(&self) -> &str {
        &self.default_drug
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Deaths in the pivoted table, as displayed on the page
    pub fn total_deaths(&self) -> usize {
        self.overdoses.len()
    }

    pub fn missing_drug_columns(&self) -> Vec<String> {
        missing_drug_columns(&self.descriptions, &self.overdoses)
    }

    pub fn demographics(&self, filter: &Filter) -> Result<ChartSpec> {
        Ok(make_demographics(&self.overdoses, filter, &self.theme)?)
    }

    pub fn race(&self, filter: &Filter) -> Result<ChartSpec> {
        Ok(make_race(&self.overdoses, filter, &self.theme)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ColumnConfig;
    use crate::data::DescriptionRecord;

    pub(crate) const PIVOT: &str = "\
Age,Sex,Race,Location,Heroin,Cocaine
34,Male,White,Residence,1,0
51,Female,Black,Hospital,0,1
29,Male,White,Hospital,1,1
";

    pub(crate) fn sample() -> Dashboard {
        let described = |name: &str| DescriptionRecord {
            name: name.to_string(),
            image_url: format!("https://img.example/{}.png", name.to_lowercase()),
            description: format!("About {}.", name),
            reference_url: format!("https://www.drugbank.ca/{}", name.to_lowercase()),
        };
        let descriptions = DescriptionTable::from_records(vec![
            described("Heroin"),
            described("Cocaine"),
            described("Everything"),
        ])
        .unwrap();
        let overdoses = OverdoseTable::from_reader(PIVOT.as_bytes(), &ColumnConfig::default()).unwrap();
        Dashboard::new(descriptions, overdoses)
    }

    #[test]
    fn test_total_deaths_is_row_count() {
        let dashboard = sample();
        assert_eq!(dashboard.total_deaths(), 3);
        assert_eq!(dashboard.total_deaths(), dashboard.overdoses().len());
    }

    #[test]
    fn test_default_drug() {
        let dashboard = sample();
        assert_eq!(dashboard.default_drug(), "Heroin");

        let dashboard = dashboard.with_default_drug("Cocaine").unwrap();
        assert_eq!(dashboard.default_drug(), "Cocaine");

        assert!(matches!(
            sample().with_default_drug("Kratom"),
            Err(Error::UnknownDefault(_))
        ));
    }

    #[test]
    fn test_no_missing_columns() {
        assert!(sample().missing_drug_columns().is_empty());
    }

    #[test]
    fn test_load_from_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pivot.csv"), PIVOT).unwrap();
        std::fs::write(
            dir.path().join("drugs.csv"),
            "Drug,Link,Description,Reference\nHeroin,h.png,Opioid.,https://x\nFentanyl,f.png,Opioid.,https://y\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("combo.html"), "<html>combo</html>").unwrap();
        let config_path = dir.path().join("overdash.toml");
        std::fs::write(
            &config_path,
            r#"
[data]
descriptions = "drugs.csv"
overdoses = "pivot.csv"
combination_chart = "combo.html"
"#,
        )
        .unwrap();

        let config = Config::from_file(&config_path).unwrap();
        let dashboard = Dashboard::load(&config).unwrap();
        assert_eq!(dashboard.total_deaths(), 3);
        assert_eq!(dashboard.combination_chart(), Some("<html>combo</html>"));
        assert_eq!(dashboard.missing_drug_columns(), ["Fentanyl"]);
    }

    #[test]
    fn test_load_missing_combination_chart_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pivot.csv"), PIVOT).unwrap();
        std::fs::write(
            dir.path().join("drugs.csv"),
            "Drug,Link,Description,Reference\nHeroin,h.png,Opioid.,https://x\n",
        )
        .unwrap();
        let config_path = dir.path().join("overdash.toml");
        std::fs::write(
            &config_path,
            "[data]\ndescriptions = \"drugs.csv\"\noverdoses = \"pivot.csv\"\ncombination_chart = \"gone.html\"\n",
        )
        .unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert!(matches!(Dashboard::load(&config), Err(Error::Io { .. })));
    }
}
