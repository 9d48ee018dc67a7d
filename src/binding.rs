//! Reactive bindings between the drug selector and its outputs
//!
//! One input, five outputs. Every change of the input re-runs each output's
//! update function to completion, independently of the others: a failing
//! output is reported on its own and the rest still update.

use crate::dashboard::{Dashboard, Result};
use crate::filter::{Filter, EVERYTHING};
use crate::lookup;
use serde::Serialize;

/// Element id of the drug selector
pub const INPUT_ID: &str = "drug1_dropdown";

/// Element/property pair an update is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Target {
    pub id: &'static str,
    pub property: &'static str,
}

pub const DRUG_IMAGE: Target = Target { id: "drug_img", property: "src" };
pub const DRUG_DESCRIPTION: Target = Target { id: "drug_desc", property: "textContent" };
pub const DRUG_REFERENCE: Target = Target { id: "drug_ref", property: "href" };
pub const DEMOGRAPHICS_PLOT: Target = Target { id: "plot_demog", property: "srcdoc" };
pub const RACE_PLOT: Target = Target { id: "plot_race", property: "srcdoc" };

pub type UpdateFn = fn(&Dashboard, &str) -> Result<String>;

/// An output and the function recomputing it
pub struct Binding {
    pub target: Target,
    update: UpdateFn,
}

impl Binding {
    pub fn new(target: Target, update: UpdateFn) -> Self {
        Self { target, update }
    }

    pub fn run(&self, dashboard: &Dashboard, value: &str) -> Update {
        match (self.update)(dashboard, value) {
            Ok(value) => Update {
                target: self.target,
                value: Some(value),
                error: None,
            },
            Err(e) => {
                tracing::warn!(output = self.target.id, error = %e, "output update failed");
                Update {
                    target: self.target,
                    value: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// New value for one output, or why it could not be computed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    #[serde(flatten)]
    pub target: Target,
    pub value: Option<String>,
    pub error: Option<String>,
}

/// The input and every output bound to it
pub struct Bindings {
    pub input: &'static str,
    bindings: Vec<Binding>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new(INPUT_ID)
            .bind(DRUG_IMAGE, update_img)
            .bind(DRUG_DESCRIPTION, update_text)
            .bind(DRUG_REFERENCE, update_link)
            .bind(DEMOGRAPHICS_PLOT, update_plot_demog)
            .bind(RACE_PLOT, update_plot_race)
    }
}

impl Bindings {
    pub fn new(input: &'static str) -> Self {
        Self {
            input,
            bindings: Vec::new(),
        }
    }

    pub fn bind(mut self, target: Target, update: UpdateFn) -> Self {
        self.bindings.push(Binding::new(target, update));
        self
    }

    /// Recompute every output for a new input value, in registration order.
    /// Surrounding whitespace is ignored and an empty value selects `Everything`.
    pub fn dispatch(&self, dashboard: &Dashboard, value: &str) -> Vec<Update> {
        let value = match value.trim() {
            "" => EVERYTHING,
            trimmed => trimmed,
        };
        tracing::debug!(input = self.input, value, "dispatching input change");
        self.bindings.iter().map(|b| b.run(dashboard, value)).collect()
    }
}

fn update_img(dashboard: &Dashboard, drug: &str) -> Result<String> {
    Ok(lookup::image_url(dashboard.descriptions(), drug)?.to_string())
}

fn update_text(dashboard: &Dashboard, drug: &str) -> Result<String> {
    Ok(lookup::description(dashboard.descriptions(), drug)?.to_string())
}

fn update_link(dashboard: &Dashboard, drug: &str) -> Result<String> {
    Ok(lookup::reference_url(dashboard.descriptions(), drug)?.to_string())
}

fn update_plot_demog(dashboard: &Dashboard, drug: &str) -> Result<String> {
    Ok(dashboard.demographics(&Filter::drug(drug))?.to_html()?)
}

fn update_plot_race(dashboard: &Dashboard, drug: &str) -> Result<String> {
    Ok(dashboard.race(&Filter::drug(drug))?.to_html()?)
}
