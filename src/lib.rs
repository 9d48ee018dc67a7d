//! Overdash - accidental drug-overdose deaths in Connecticut, 2012-2018
//!
//! A single-page dashboard over two static tables: a drug description
//! spreadsheet and a pivoted per-victim CSV with one boolean column per drug.
//!
//! # Components
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`data`] | Load the description and overdose tables at startup |
//! | [`lookup`] | Image, description and reference for one drug |
//! | [`filter`] | Restrict victims by drug, race and place of death |
//! | [`chart`] | Vega-Lite demographics and race charts |
//! | [`page`] | The dashboard page layout |
//! | [`binding`] | Drug selector → five outputs |
//! | [`serve`] | Local HTTP server for the page and its callbacks |
//!
//! # Quick Start
//!
//! ```no_run
//! use overdash::{Config, Dashboard, Filter};
//!
//! let config = Config::load(None).unwrap();
//! let dashboard = Dashboard::load(&config).unwrap();
//!
//! println!("Deaths: {}", dashboard.total_deaths());
//!
//! let chart = dashboard.race(&Filter::drug("Heroin")).unwrap();
//! println!("{}", chart.to_json().unwrap());
//! ```

pub mod binding;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod filter;
pub mod logging;
pub mod lookup;
pub mod markup;
pub mod page;
pub mod serve;

pub use binding::{Bindings, Target, Update, INPUT_ID};
pub use chart::{ChartError, ChartKind, ChartSpec, Theme, AGE_BINS};
pub use config::{Config, ConfigError};
pub use dashboard::{Dashboard, Error};
pub use data::{DataError, DescriptionRecord, DescriptionTable, OverdoseRecord, OverdoseTable};
pub use filter::{Filter, FilterError, EVERYTHING};
pub use lookup::LookupError;
pub use page::PageMode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify core items are re-exported from crate root
        assert_eq!(EVERYTHING, "Everything");
        assert_eq!(AGE_BINS, 10);
        assert_eq!(INPUT_ID, "drug1_dropdown");
    }
}
