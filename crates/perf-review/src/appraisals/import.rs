use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::RatedItem;

/// Rated groups read from a spreadsheet export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingSheet {
    pub kras: Vec<RatedItem>,
    pub self_ratings: Vec<RatedItem>,
    pub kpis: Vec<RatedItem>,
    pub competencies: Vec<RatedItem>,
    pub culture: Vec<RatedItem>,
}

impl RatingSheet {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RatingImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse CSV rows with the headers `Group, Item ID, Title, Weight, Score, Max Score`.
    /// `Max Score` may be blank (defaults to 5); `Score` may be blank (ungraded).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RatingImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut sheet = RatingSheet::default();

        for (index, row) in csv_reader.deserialize::<SheetRow>().enumerate() {
            let row = row?;
            // header is line 1
            let line = index + 2;
            let target = match normalize_group(&row.group).as_str() {
                "kra" | "kras" | "goal" | "goals" => &mut sheet.kras,
                "self" | "self rating" | "self_rating" | "self-rating" => &mut sheet.self_ratings,
                "kpi" | "kpis" => &mut sheet.kpis,
                "competency" | "competencies" => &mut sheet.competencies,
                "culture" => &mut sheet.culture,
                _ => {
                    return Err(RatingImportError::UnknownGroup {
                        group: row.group,
                        line,
                    })
                }
            };

            target.push(RatedItem {
                id: row.item_id,
                title: row.title,
                weight: row.weight,
                score: row.score.unwrap_or(0.0),
                max_score: row.max_score.unwrap_or(5.0),
            });
        }

        Ok(sheet)
    }

    pub fn is_empty(&self) -> bool {
        self.kras.is_empty()
            && self.self_ratings.is_empty()
            && self.kpis.is_empty()
            && self.competencies.is_empty()
            && self.culture.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RatingImportError {
    #[error("failed to read rating sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rating sheet data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown rating group '{group}' on line {line}")]
    UnknownGroup { group: String, line: usize },
}

#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(rename = "Group")]
    group: String,
    #[serde(rename = "Item ID")]
    item_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "Score", default)]
    score: Option<f64>,
    #[serde(rename = "Max Score", default)]
    max_score: Option<f64>,
}

fn normalize_group(value: &str) -> String {
    let cleaned = value.replace('\u{feff}', "");
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}
