//! Dataset loading
//!
//! Two static tables are read once at startup and never mutated:
//! the drug description spreadsheet and the pivoted per-victim CSV.

use crate::config::ColumnConfig;
use crate::filter::EVERYTHING;
use calamine::{open_workbook_auto, Data, Reader};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column names in the description table
pub const DRUG_COLUMN: &str = "Drug";
pub const LINK_COLUMN: &str = "Link";
pub const DESCRIPTION_COLUMN: &str = "Description";
pub const REFERENCE_COLUMN: &str = "Reference";

/// Error type for dataset loading
#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("worksheet '{0}' not found")]
    MissingSheet(String),
    #[error("workbook has no worksheets")]
    EmptyWorkbook,
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("line {line}: invalid {column} value '{value}'")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },
    #[error("duplicate drug '{0}' in description table")]
    DuplicateKey(String),
    #[error("record has {found} drug flags, table has {expected} drug columns")]
    Schema { expected: usize, found: usize },
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<DataError>,
    },
}

impl DataError {
    fn in_file(self, path: &Path) -> Self {
        DataError::InFile {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

/// One drug: name plus display material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionRecord {
    pub name: String,
    pub image_url: String,
    pub description: String,
    pub reference_url: String,
}

/// Drug descriptions keyed by unique name, in file order
#[derive(Debug, Clone, Default)]
pub struct DescriptionTable {
    records: Vec<DescriptionRecord>,
}

impl DescriptionTable {
    /// Load from a spreadsheet (.xlsx/.xls/.ods) or a CSV, chosen by extension
    pub fn load(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let is_csv = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let rows = if is_csv {
            read_csv_rows(path)
        } else {
            read_sheet_rows(path, sheet)
        }
        .map_err(|e| e.in_file(path))?;

        let table = Self::from_rows(rows).map_err(|e| e.in_file(path))?;
        tracing::info!(path = %path.display(), drugs = table.len(), "loaded drug descriptions");
        Ok(table)
    }

    /// Build from a header row followed by data rows
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self> {
        let mut rows = rows.into_iter();
        let header = rows.next().unwrap_or_default();
        let col = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };
        let (drug, link, desc, reference) = (
            col(DRUG_COLUMN)?,
            col(LINK_COLUMN)?,
            col(DESCRIPTION_COLUMN)?,
            col(REFERENCE_COLUMN)?,
        );

        let field = |row: &[String], i: usize| row.get(i).map(|s| s.trim().to_string()).unwrap_or_default();

        let records = rows
            .filter(|row| !field(row, drug).is_empty())
            .map(|row| DescriptionRecord {
                name: field(&row, drug),
                image_url: field(&row, link),
                description: field(&row, desc),
                reference_url: field(&row, reference),
            })
            .collect();

        Self::from_records(records)
    }

    /// Build from records, rejecting duplicate names
    pub fn from_records(records: Vec<DescriptionRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.name.as_str()) {
                return Err(DataError::DuplicateKey(record.name.clone()));
            }
        }
        Ok(Self { records })
    }

    pub fn get(&self, key: &str) -> Option<&DescriptionRecord> {
        self.records.iter().find(|r| r.name == key)
    }

    /// Drug names in file order (the dropdown options)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn records(&self) -> &[DescriptionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One overdose victim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdoseRecord {
    pub age: Option<f64>,
    pub sex: String,
    pub race: String,
    pub place: String,
    /// Involvement flag per drug column, in table column order
    involvement: Vec<bool>,
}

impl OverdoseRecord {
    pub fn new(
        age: Option<f64>,
        sex: impl Into<String>,
        race: impl Into<String>,
        place: impl Into<String>,
        involvement: Vec<bool>,
    ) -> Self {
        Self {
            age,
            sex: sex.into(),
            race: race.into(),
            place: place.into(),
            involvement,
        }
    }

    /// Whether the drug at `drug_index` was involved in this death
    pub fn involves(&self, drug_index: usize) -> bool {
        self.involvement.get(drug_index).copied().unwrap_or(false)
    }
}

/// Pivoted table: one row per victim, one boolean column per drug
#[derive(Debug, Clone, Default)]
pub struct OverdoseTable {
    drugs: Vec<String>,
    records: Vec<OverdoseRecord>,
}

impl OverdoseTable {
    pub fn new(drugs: Vec<String>, records: Vec<OverdoseRecord>) -> Result<Self> {
        if let Some(bad) = records.iter().find(|r| r.involvement.len() != drugs.len()) {
            return Err(DataError::Schema {
                expected: drugs.len(),
                found: bad.involvement.len(),
            });
        }
        Ok(Self { drugs, records })
    }

    pub fn load(path: &Path, columns: &ColumnConfig) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| DataError::Csv(e.into()).in_file(path))?;
        let table = Self::from_reader(file, columns).map_err(|e| e.in_file(path))?;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            drugs = table.drugs.len(),
            "loaded overdose records"
        );
        Ok(table)
    }

    /// Parse the pivoted CSV. Drug columns are every named, non-demographic
    /// column whose values are all boolean-like.
    pub fn from_reader<R: Read>(reader: R, columns: &ColumnConfig) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

        let col = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };
        let (age, sex, race, place) = (
            col(&columns.age)?,
            col(&columns.sex)?,
            col(&columns.race)?,
            col(&columns.place)?,
        );

        let drug_columns: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| ![age, sex, race, place].contains(i) && is_named(h))
            .filter(|(i, _)| rows.iter().all(|r| parse_flag(r.get(*i).unwrap_or("")).is_some()))
            .map(|(i, _)| i)
            .collect();

        let mut records = Vec::with_capacity(rows.len());
        for (n, row) in rows.iter().enumerate() {
            let cell = |i: usize| row.get(i).unwrap_or("").trim();
            let age_value = parse_age(cell(age)).map_err(|_| DataError::InvalidValue {
                line: n + 2,
                column: columns.age.clone(),
                value: cell(age).to_string(),
            })?;
            records.push(OverdoseRecord {
                age: age_value,
                sex: cell(sex).to_string(),
                race: cell(race).to_string(),
                place: cell(place).to_string(),
                involvement: drug_columns
                    .iter()
                    .map(|&i| parse_flag(cell(i)).unwrap_or(false))
                    .collect(),
            });
        }

        Ok(Self {
            drugs: drug_columns.iter().map(|&i| headers[i].clone()).collect(),
            records,
        })
    }

    /// Total number of deaths
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drug column names, in file order
    pub fn drugs(&self) -> &[String] {
        &self.drugs
    }

    pub fn drug_index(&self, name: &str) -> Option<usize> {
        self.drugs.iter().position(|d| d == name)
    }

    pub fn records(&self) -> &[OverdoseRecord] {
        &self.records
    }

    /// Deaths involving each drug, in column order
    pub fn involvement_counts(&self) -> Vec<(String, usize)> {
        self.drugs
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let count = self.records.iter().filter(|r| r.involves(i)).count();
                (name.clone(), count)
            })
            .collect()
    }
}

/// Description keys (other than "Everything") with no matching drug column
pub fn missing_drug_columns(descriptions: &DescriptionTable, overdoses: &OverdoseTable) -> Vec<String> {
    descriptions
        .keys()
        .filter(|k| *k != EVERYTHING && overdoses.drug_index(k).is_none())
        .map(str::to_string)
        .collect()
}

fn is_named(header: &str) -> bool {
    !header.is_empty() && !header.starts_with("Unnamed:")
}

/// Parse an involvement flag as pandas would have written it
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "1.0" | "true" | "True" | "TRUE" | "Y" | "y" => Some(true),
        "" | "0" | "0.0" | "false" | "False" | "FALSE" | "N" | "n" => Some(false),
        _ => None,
    }
}

fn parse_age(value: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    if value.is_empty() {
        return Ok(None);
    }
    let age: f64 = value.parse()?;
    Ok(age.is_finite().then_some(age))
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_sheet_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(DataError::MissingSheet(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or(DataError::EmptyWorkbook)??,
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
