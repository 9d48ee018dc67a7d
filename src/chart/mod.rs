//! Declarative chart specifications
//!
//! Charts are Vega-Lite documents carrying pre-aggregated inline data.
//! Rendering happens in the browser; [`ChartSpec::to_html`] wraps a spec in
//! a standalone document suitable for an iframe `srcdoc`.

pub mod aggregate;
pub mod builders;
pub mod theme;

pub use aggregate::{count_by, histogram, Bin, AGE_BINS};
pub use builders::{make_demographics, make_race, ChartKind};
pub use theme::Theme;

use crate::filter::FilterError;
use crate::markup::script_json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v4.17.0.json";

const VEGA_CDN: &str = "https://cdn.jsdelivr.net/npm/vega@5";
const VEGA_LITE_CDN: &str = "https://cdn.jsdelivr.net/npm/vega-lite@4.17.0";
const VEGA_EMBED_CDN: &str = "https://cdn.jsdelivr.net/npm/vega-embed@6";

#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("failed to serialize chart: {0}")]
    Json(#[from] serde_json::Error),
}

/// A Vega-Lite chart specification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChartSpec(Value);

impl ChartSpec {
    pub fn new(spec: Value) -> Self {
        Self(spec)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn to_json(&self) -> Result<String, ChartError> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Standalone HTML document that renders the chart with vega-embed
    pub fn to_html(&self) -> Result<String, ChartError> {
        let spec = script_json(&self.0)?;
        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <style>
    body {{ margin: 0; }}
    .error {{ color: red; }}
  </style>
  <script type="text/javascript" src="{vega}"></script>
  <script type="text/javascript" src="{vega_lite}"></script>
  <script type="text/javascript" src="{vega_embed}"></script>
</head>
<body>
  <div id="vis"></div>
  <script>
    (function(spec, embedOpt) {{
      const el = document.getElementById('vis');
      function showError(error) {{
        el.innerHTML = '<div class="error" style="color:red;">'
          + '<p>JavaScript Error: ' + error.message + '</p>'
          + "<p>This usually means there's a typo in your chart specification. "
          + "See the javascript console for the full traceback.</p>"
          + '</div>';
        throw error;
      }}
      vegaEmbed(el, spec, embedOpt).catch(showError);
    }})({spec}, {{"mode": "vega-lite"}});
  </script>
</body>
</html>
"#,
            vega = VEGA_CDN,
            vega_lite = VEGA_LITE_CDN,
            vega_embed = VEGA_EMBED_CDN,
            spec = spec,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_html_embeds_spec() {
        let spec = ChartSpec::new(json!({"mark": "bar", "title": "</script>"}));
        let html = spec.to_html().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("vegaEmbed"));
        assert!(html.contains(r#""mark":"bar""#));
        assert_eq!(html.matches("</script>").count(), 4);
    }

    #[test]
    fn test_serializes_transparently() {
        let spec = ChartSpec::new(json!({"mark": "bar"}));
        assert_eq!(serde_json::to_string(&spec).unwrap(), r#"{"mark":"bar"}"#);
    }
}
