//! Dataset sources.
//!
//! Plants arrive as delimited text with a header row, fetched from a URL,
//! read from a local file, or substituted by the in-memory mock set. The
//! whole source is re-parsed on every load; there is no incremental read.
//! Header names map to record fields by a fixed table, with the known
//! variants of the water column accepted. A missing column yields empty
//! fields, never a per-row error; only rows unreadable as delimited text
//! are dropped by the reader.

use std::io::Cursor;

use polars::prelude::*;

use crate::error::Result;
use crate::model::NewPlant;

// Header-name-to-field mapping, first match wins.
const COL_NAME: &[&str] = &["Type"];
const COL_SEASON: &[&str] = &["Growth_Season"];
const COL_TEMPERATURE: &[&str] = &["Temperature_C"];
const COL_POT_SIZE: &[&str] = &["Pot_Size"];
const COL_LIGHT_TYPE: &[&str] = &["Light_Type"];
const COL_SOIL_TYPE: &[&str] = &["Soil_Type"];
const COL_REQUIREMENTS: &[&str] = &["Growth_Requirements"];
const COL_CARE: &[&str] = &["Care_Instructions"];
const COL_WATER_ML: &[&str] = &[
    "Water_ml_Notif",
    "Water.ml_Notif/day",
    "Water_ml_Notif/day",
    "Water_ml_day",
];
const COL_TRACKER: &[&str] = &["Growth_Tracker"];
const COL_BENEFIT: &[&str] = &["Benefit"];

/// Load plants from `source`: an `http(s)` URL is fetched, anything else is
/// read as a local file path.
pub async fn load_source(source: &str) -> Result<Vec<NewPlant>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_plants_csv(source).await
    } else {
        read_plants_file(source)
    }
}

/// Fetch a CSV resource and parse it.
///
/// Network failure or a non-success status is fatal to the whole operation;
/// nothing is parsed from a partial response.
pub async fn fetch_plants_csv(url: &str) -> Result<Vec<NewPlant>> {
    tracing::info!("Fetching plants CSV from {}", url);
    let text = reqwest::get(url).await?.error_for_status()?.text().await?;
    parse_plants_csv(&text)
}

/// Read and parse a local CSV file.
pub fn read_plants_file(path: &str) -> Result<Vec<NewPlant>> {
    tracing::info!("Reading plants CSV from {}", path);
    let text = std::fs::read_to_string(path)?;
    parse_plants_csv(&text)
}

/// Parse CSV text into insert payloads.
///
/// Every column is read as a string (the water column is parsed to an
/// integer afterwards, defaulting to 0 like the rest of the pipeline).
/// Rows without a display name are dropped.
pub fn parse_plants_csv(text: &str) -> Result<Vec<NewPlant>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_truncate_ragged_lines(true))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes()))
        .finish()?;

    let name = str_col(&df, COL_NAME);
    let season = str_col(&df, COL_SEASON);
    let temperature = str_col(&df, COL_TEMPERATURE);
    let pot_size = str_col(&df, COL_POT_SIZE);
    let light_type = str_col(&df, COL_LIGHT_TYPE);
    let soil_type = str_col(&df, COL_SOIL_TYPE);
    let requirements = str_col(&df, COL_REQUIREMENTS);
    let care = str_col(&df, COL_CARE);
    let water_ml = str_col(&df, COL_WATER_ML);
    let tracker = str_col(&df, COL_TRACKER);
    let benefit = str_col(&df, COL_BENEFIT);

    let mut plants = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let name_ar = cell(name, idx);
        if name_ar.is_empty() {
            continue;
        }

        plants.push(NewPlant {
            name_ar,
            season: cell(season, idx),
            temperature: cell(temperature, idx),
            water_ml: cell(water_ml, idx).parse().unwrap_or(0),
            pot_size: cell(pot_size, idx),
            light_type: cell(light_type, idx),
            soil_type: cell(soil_type, idx),
            growth_requirements: cell(requirements, idx),
            care_instructions: cell(care, idx),
            growth_tracker: cell(tracker, idx),
            benefit: cell(benefit, idx),
        });
    }

    tracing::info!("Parsed {} plants", plants.len());
    Ok(plants)
}

/// First present string column among `names`.
fn str_col<'a>(df: &'a DataFrame, names: &[&str]) -> Option<&'a StringChunked> {
    names
        .iter()
        .find_map(|name| df.column(name).ok().and_then(|col| col.str().ok()))
}

/// Cell value at `idx`, trimmed; missing column or null cell is empty.
fn cell(col: Option<&StringChunked>, idx: usize) -> String {
    col.and_then(|c| c.get(idx)).unwrap_or("").trim().to_string()
}

/// Static mock dataset used when no CSV source is configured.
pub fn mock_plants() -> Vec<NewPlant> {
    fn plant(
        name_ar: &str,
        season: &str,
        temperature: &str,
        water_ml: u32,
        pot_size: &str,
        light_type: &str,
        soil_type: &str,
        benefit: &str,
    ) -> NewPlant {
        NewPlant {
            name_ar: name_ar.to_string(),
            season: season.to_string(),
            temperature: temperature.to_string(),
            water_ml,
            pot_size: pot_size.to_string(),
            light_type: light_type.to_string(),
            soil_type: soil_type.to_string(),
            benefit: benefit.to_string(),
            ..Default::default()
        }
    }

    vec![
        plant("الريحان", "Summer", "17–26", 250, "small", "Full sun", "Loamy", "Aromatic"),
        plant("النعناع", "Spring", "13–19", 300, "small", "Partial shade", "Clay", "Edible"),
        plant("الصبار", "Summer", "20–27", 50, "medium", "Full sun", "Sandy", "Medicinal"),
        plant("اللافندر", "Spring", "17–26", 150, "medium", "Full sun", "Well-drained", "Aromatic"),
        plant("نبات الثعبان", "Winter", "13–19", 100, "small", "Indirect light", "Well-drained", "Air purifying"),
        plant("البوتس", "Autumn", "17–26", 200, "small", "Indirect light", "Loamy", "Air purifying"),
        plant("الياسمين", "Summer", "20–27", 350, "large", "Full sun", "Loamy", "Decorative"),
        plant("الورد الجوري", "Spring", "17–26", 400, "ground", "Full sun", "Clay", "Decorative"),
    ]
}
