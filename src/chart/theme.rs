//! Fixed visual theme applied to every dashboard chart

use serde_json::{json, Value};

/// Fonts, colours and axis styling shared by all charts
#[derive(Debug, Clone)]
pub struct Theme {
    pub font: &'static str,
    pub axis_color: &'static str,
    pub grid_color: &'static str,
    pub title_color: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font: "Arial",
            axis_color: "#000000",
            grid_color: "#DEDDDD",
            title_color: "#000000",
        }
    }
}

impl Theme {
    /// Vega-Lite `config` block
    pub fn config(&self) -> Value {
        json!({
            "title": {
                "fontSize": 24,
                "font": self.font,
                "anchor": "start",
                "color": self.title_color
            },
            "view": {
                "height": 300,
                "width": 400
            },
            "axisX": {
                "domain": true,
                "gridColor": self.grid_color,
                "domainWidth": 1,
                "grid": false,
                "labelFont": self.font,
                "labelFontSize": 12,
                "labelAngle": 0,
                "tickColor": self.axis_color,
                "tickSize": 5,
                "titleFont": self.font,
                "titleFontSize": 16,
                "titlePadding": 10,
                "title": "X Axis Title (units)"
            },
            "axisY": {
                "domain": false,
                "grid": true,
                "gridColor": self.grid_color,
                "gridWidth": 1,
                "labelFont": self.font,
                "labelFontSize": 14,
                "labelAngle": 0,
                "titleFont": self.font,
                "titleFontSize": 16,
                "titlePadding": 10,
                "title": "Y Axis Title (units)"
            }
        })
    }
}
