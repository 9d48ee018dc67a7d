//! Demographics and race charts for a selected category

use super::aggregate::{count_by, histogram, AGE_BINS};
use super::theme::Theme;
use super::{ChartError, ChartSpec, VEGA_LITE_SCHEMA};
use crate::data::{OverdoseRecord, OverdoseTable};
use crate::filter::{Filter, SEXES};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const AGE_COLOR: &str = "#3f7d4e";
const CATEGORY_SCHEME: &str = "viridis";
const LABEL_ANGLE: i32 = -45;
const COUNT_TITLE: &str = "Count of Records";

/// The charts the dashboard can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Demographics,
    Race,
}

impl ChartKind {
    pub fn build(self, table: &OverdoseTable, filter: &Filter, theme: &Theme) -> Result<ChartSpec, ChartError> {
        match self {
            ChartKind::Demographics => make_demographics(table, filter, theme),
            ChartKind::Race => make_race(table, filter, theme),
        }
    }
}

impl std::str::FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "demographics" => Ok(ChartKind::Demographics),
            "race" => Ok(ChartKind::Race),
            other => Err(format!("unknown chart '{}': expected demographics or race", other)),
        }
    }
}

/// Age histogram and sex counts side by side, for victims recorded as
/// Male or Female
pub fn make_demographics(table: &OverdoseTable, filter: &Filter, theme: &Theme) -> Result<ChartSpec, ChartError> {
    let rows: Vec<&OverdoseRecord> = table
        .select(filter)?
        .into_iter()
        .filter(|r| SEXES.contains(&r.sex.as_str()))
        .collect();
    let label = filter.label();

    tracing::debug!(filter = %label, rows = rows.len(), "building demographics chart");

    let bins = histogram(rows.iter().filter_map(|r| r.age));
    let step = bins.first().map(|b| b.end - b.start).unwrap_or(1.0);
    let age_values: Vec<Value> = bins
        .iter()
        .map(|b| json!({"bin_start": b.start, "bin_end": b.end, "count": b.count}))
        .collect();

    let age = json!({
        "data": {"values": age_values},
        "mark": {"type": "bar", "color": AGE_COLOR},
        "encoding": {
            "x": {
                "field": "bin_start",
                "type": "quantitative",
                "bin": {"binned": true, "step": step, "maxbins": AGE_BINS},
                "title": "Age",
                "axis": {"labelAngle": LABEL_ANGLE}
            },
            "x2": {"field": "bin_end"},
            "y": {"field": "count", "type": "quantitative", "title": COUNT_TITLE}
        },
        "title": format!("Age distribution for {}", label),
        "width": 290,
        "height": 200
    });

    let gender = count_chart(
        "Sex",
        &count_by(rows.iter().map(|r| r.sex.as_str())),
        format!("Gender distribution for {}", label),
        190,
        200,
    );

    Ok(ChartSpec::new(json!({
        "$schema": VEGA_LITE_SCHEMA,
        "config": theme.config(),
        "hconcat": [age, gender]
    })))
}

/// Race counts, every recorded sex included
pub fn make_race(table: &OverdoseTable, filter: &Filter, theme: &Theme) -> Result<ChartSpec, ChartError> {
    let rows = table.select(filter)?;
    let label = filter.label();

    tracing::debug!(filter = %label, rows = rows.len(), "building race chart");

    let mut chart = count_chart(
        "Race",
        &count_by(rows.iter().map(|r| r.race.as_str())),
        format!("Race distribution for {}", label),
        400,
        180,
    );
    if let Value::Object(map) = &mut chart {
        map.insert("$schema".into(), json!(VEGA_LITE_SCHEMA));
        map.insert("config".into(), theme.config());
    }
    Ok(ChartSpec::new(chart))
}

/// Nominal bar chart coloured per category, no legend
fn count_chart(field: &str, counts: &[(String, usize)], title: String, width: u32, height: u32) -> Value {
    let values: Vec<Value> = counts
        .iter()
        .map(|(label, count)| {
            let mut row = Map::new();
            row.insert(field.to_string(), json!(label));
            row.insert("count".to_string(), json!(count));
            Value::Object(row)
        })
        .collect();

    json!({
        "data": {"values": values},
        "mark": "bar",
        "encoding": {
            "x": {
                "field": field,
                "type": "nominal",
                "title": field,
                "axis": {"labelAngle": LABEL_ANGLE}
            },
            "y": {"field": "count", "type": "quantitative", "title": COUNT_TITLE},
            "color": {
                "field": field,
                "type": "nominal",
                "scale": {"scheme": CATEGORY_SCHEME},
                "legend": null
            }
        },
        "title": title,
        "width": width,
        "height": height
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::EVERYTHING;

    fn table() -> OverdoseTable {
        OverdoseTable::new(
            vec!["Heroin".into(), "Fentanyl".into()],
            vec![
                OverdoseRecord::new(Some(25.0), "Male", "White", "Residence", vec![true, true]),
                OverdoseRecord::new(Some(38.0), "Female", "Black", "Hospital", vec![true, false]),
                OverdoseRecord::new(Some(52.0), "Male", "White", "Hospital", vec![false, true]),
                OverdoseRecord::new(Some(61.0), "Unknown", "Hispanic, White", "Other", vec![true, false]),
            ],
        )
        .unwrap()
    }

    fn total(values: &Value) -> u64 {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["count"].as_u64().unwrap())
            .sum()
    }

    #[test]
    fn test_demographics_excludes_unknown_sex() {
        let spec = make_demographics(&table(), &Filter::drug("Heroin"), &Theme::default()).unwrap();
        let v = spec.as_value();

        let age = &v["hconcat"][0];
        assert_eq!(age["title"], "Age distribution for Heroin");
        assert_eq!(age["data"]["values"].as_array().unwrap().len(), AGE_BINS);
        assert_eq!(total(&age["data"]["values"]), 2);

        let gender = &v["hconcat"][1];
        assert_eq!(gender["title"], "Gender distribution for Heroin");
        assert_eq!(gender["data"]["values"][0]["Sex"], "Female");
        assert_eq!(gender["data"]["values"][1]["Sex"], "Male");
        assert_eq!(total(&gender["data"]["values"]), 2);
        assert!(gender["encoding"]["color"]["legend"].is_null());
    }

    #[test]
    fn test_demographics_everything() {
        let spec = make_demographics(&table(), &Filter::drug(EVERYTHING), &Theme::default()).unwrap();
        let age = &spec.as_value()["hconcat"][0];
        assert_eq!(age["title"], "Age distribution for Everything");
        assert_eq!(total(&age["data"]["values"]), 3);
        assert_eq!(age["mark"]["color"], AGE_COLOR);
    }

    #[test]
    fn test_race_includes_all_sexes() {
        let spec = make_race(&table(), &Filter::drug("Heroin"), &Theme::default()).unwrap();
        let v = spec.as_value();
        assert_eq!(v["title"], "Race distribution for Heroin");
        assert_eq!(v["width"], 400);
        assert_eq!(v["height"], 180);
        assert_eq!(v["$schema"], VEGA_LITE_SCHEMA);
        assert_eq!(v["config"]["title"]["font"], "Arial");
        assert_eq!(total(&v["data"]["values"]), 3);
        assert_eq!(v["encoding"]["color"]["scale"]["scheme"], "viridis");
    }

    #[test]
    fn test_race_with_place_filter() {
        let filter = Filter::drug(EVERYTHING).with_place("Hospital");
        let spec = make_race(&table(), &filter, &Theme::default()).unwrap();
        let v = spec.as_value();
        assert_eq!(v["title"], "Race distribution for Everything (Hospital)");
        assert_eq!(total(&v["data"]["values"]), 2);
    }

    #[test]
    fn test_unknown_drug_is_error() {
        let err = make_race(&table(), &Filter::drug("Kratom"), &Theme::default()).unwrap_err();
        assert!(matches!(err, ChartError::Filter(_)));
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!("race".parse::<ChartKind>().unwrap(), ChartKind::Race);
        assert_eq!("demographics".parse::<ChartKind>().unwrap(), ChartKind::Demographics);
        assert!("pie".parse::<ChartKind>().is_err());
    }
}
