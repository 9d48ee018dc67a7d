//! Dashboard page layout
//!
//! Static structure (titles, explanatory text, containers) with the initial
//! outputs for the default drug and the pre-rendered combination chart
//! embedded. In [`PageMode::Live`] the selector calls back to the server; in
//! [`PageMode::Static`] every drug's outputs are embedded so the file works
//! on its own.

use crate::binding::{
    Bindings, Update, DEMOGRAPHICS_PLOT, DRUG_DESCRIPTION, DRUG_IMAGE, DRUG_REFERENCE, INPUT_ID,
    RACE_PLOT,
};
use crate::dashboard::{Dashboard, Error, Result};
use crate::markup::{escape, script_json};
use std::collections::BTreeMap;
use std::fmt::Write;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@4.6.2/dist/css/bootstrap.min.css";

pub const TITLE: &str = "Overdash";
pub const HEADLINE: &str = "Accidental overdose victims by drugs type";
pub const SUBTITLE: &str =
    "A dashboard showing deaths by accidental overdose in Connecticut from 2012 to 2018";
pub const REFERENCE_TEXT: &str = "This info was retrieved from drugbank.ca";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Selector changes are fetched from `/api/select`
    Live,
    /// Outputs for every drug are embedded in the page
    Static,
}

/// Sentence introducing the dashboard with the total death count
pub fn main_text(total_deaths: usize) -> String {
    format!(
        "From 2012 to 2018, {} deaths occurred due to accidental overdose in Connecticut. \
         This dashboard was created with the intent to provide a visual representation of the crisis",
        total_deaths
    )
}

/// Render the full page
pub fn render(dashboard: &Dashboard, mode: PageMode) -> Result<String> {
    let bindings = Bindings::default();
    let initial = initial_outputs(&bindings, dashboard)?;
    let output = |id: &str| initial.get(id).map(String::as_str).unwrap_or_default();

    let snapshot = match mode {
        PageMode::Live => "null".to_string(),
        PageMode::Static => {
            let all: BTreeMap<&str, Vec<Update>> = dashboard
                .descriptions()
                .keys()
                .map(|key| (key, bindings.dispatch(dashboard, key)))
                .collect();
            script_json(&all).map_err(|e| Error::Chart(e.into()))?
        }
    };

    let mut html = String::new();
    write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="{bootstrap}">
    <style>
        .uppercase {{ text-transform: uppercase; }}
        iframe {{ border-width: 0; }}
    </style>
</head>
<body>
<div class="container-fluid">
    <div class="row">
        <div class="col-2"></div>
        <div class="col-8">
            <div class="jumbotron">
                <h1>{title}</h1>
                <h3 class="uppercase title">{headline}</h3>
                <span>{subtitle}</span>
            </div>
        </div>
        <div class="col-2"></div>
    </div>
    <div class="row">
        <div class="col-2"></div>
        <div class="col-8">
            <div class="row"><p id="problem_desc">{main_text}</p></div>
        </div>
        <div class="col-2"></div>
    </div>
"#,
        title = TITLE,
        bootstrap = BOOTSTRAP_CSS,
        headline = escape(HEADLINE),
        subtitle = escape(SUBTITLE),
        main_text = escape(&main_text(dashboard.total_deaths())),
    )?;

    write!(
        html,
        r#"    <div class="row">
        <div class="col-3"></div>
        <div class="col-7">
            <h3>The Killers</h3>
"#
    )?;
    if let Some(document) = dashboard.combination_chart() {
        writeln!(
            html,
            r#"            <iframe sandbox="allow-scripts" id="plot" height="650" width="800" srcdoc="{}"></iframe>"#,
            escape(document)
        )?;
    }
    write!(
        html,
        r#"        </div>
    </div>
    <div class="row">
        <div class="col-2"></div>
        <div class="col-6"><h3>The Victims</h3></div>
        <div class="col-2"></div>
    </div>
    <div class="row">
        <div class="col-2"></div>
        <div class="col-6"><p>This section shows the social demographic effected by the selected drug</p></div>
        <div class="col-1"></div>
    </div>
"#
    )?;

    write!(
        html,
        r#"    <div class="row">
        <div class="col-2"></div>
        <div class="col-3">
            <select id="{input}" class="form-control">
"#,
        input = INPUT_ID
    )?;
    for key in dashboard.descriptions().keys() {
        let selected = if key == dashboard.default_drug() { " selected" } else { "" };
        writeln!(
            html,
            r#"                <option value="{0}"{1}>{0}</option>"#,
            escape(key),
            selected
        )?;
    }
    write!(
        html,
        r#"            </select>
            <img id="{img_id}" src="{img}" height="150" width="200">
            <p id="{desc_id}">{desc}</p>
            <a id="{ref_id}" href="{reference}" target="_blank">{reference_text}</a>
        </div>
        <div class="col-6">
            <div class="row">
                <iframe sandbox="allow-scripts" id="{demog_id}" height="400" width="1500" srcdoc="{demog}"></iframe>
                <div class="row">
                    <div class="col-2"></div>
                    <div class="col-4">
                        <iframe sandbox="allow-scripts" id="{race_id}" height="300" width="800" srcdoc="{race}"></iframe>
                    </div>
                    <div class="col-2"></div>
                </div>
            </div>
        </div>
    </div>
"#,
        img_id = DRUG_IMAGE.id,
        img = escape(output(DRUG_IMAGE.id)),
        desc_id = DRUG_DESCRIPTION.id,
        desc = escape(output(DRUG_DESCRIPTION.id)),
        ref_id = DRUG_REFERENCE.id,
        reference = escape(output(DRUG_REFERENCE.id)),
        reference_text = REFERENCE_TEXT,
        demog_id = DEMOGRAPHICS_PLOT.id,
        demog = escape(output(DEMOGRAPHICS_PLOT.id)),
        race_id = RACE_PLOT.id,
        race = escape(output(RACE_PLOT.id)),
    )?;

    if mode == PageMode::Static {
        writeln!(
            html,
            r#"    <p class="text-muted small">Generated {}</p>"#,
            chrono::Local::now().format("%Y-%m-%d %H:%M")
        )?;
    }

    write!(
        html,
        r#"</div>
<script>
const INPUT_ID = "{input}";
const SNAPSHOT = {snapshot};

function apply(updates) {{
    for (const u of updates) {{
        const el = document.getElementById(u.id);
        if (!el) continue;
        if (u.error) {{
            console.error(u.id + ": " + u.error);
            continue;
        }}
        el[u.property] = u.value;
    }}
}}

document.getElementById(INPUT_ID).addEventListener("change", async (event) => {{
    const value = event.target.value;
    if (SNAPSHOT) {{
        apply(SNAPSHOT[value] || []);
        return;
    }}
    const res = await fetch("/api/select?value=" + encodeURIComponent(value));
    const body = await res.json();
    if (body.ok) {{
        apply(body.data);
    }} else {{
        console.error(body.error);
    }}
}});
</script>
</body>
</html>
"#,
        input = INPUT_ID,
        snapshot = snapshot,
    )?;

    Ok(html)
}

/// Outputs for the default drug, keyed by element id.
/// A failure here means the page cannot be built.
fn initial_outputs(bindings: &Bindings, dashboard: &Dashboard) -> Result<BTreeMap<&'static str, String>> {
    bindings
        .dispatch(dashboard, dashboard.default_drug())
        .into_iter()
        .map(|update| match (update.value, update.error) {
            (Some(value), _) => Ok((update.target.id, value)),
            (None, error) => Err(Error::InitialOutput {
                output: update.target.id,
                message: error.unwrap_or_default(),
            }),
        })
        .collect()
}
