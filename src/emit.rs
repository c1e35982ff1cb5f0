//! Transform pipeline: reads tabular rows (local CSV or an HTTP export),
//! normalizes them, and renders static-site artifacts — a JS array literal
//! or an HTML card fragment.

use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::normalize::{NormalizeError, RawRow, normalize_row};
use crate::types::ProgramRecord;

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("Input file not found: {0}")]
    MissingInput(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Artifact flavor for the transform pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Js,
    Html,
}

/// Display object for one program card, shaped the way the site frontend
/// expects. Fields beyond the canonical record are fixed defaults.
#[derive(Debug, Serialize)]
pub struct ProgramCard {
    pub title: String,
    pub fgos_code: String,
    pub fgos_name: String,
    pub institution: String,
    pub district: String,
    pub level: &'static str,
    pub level_readable: &'static str,
    pub base: &'static str,
    pub duration: &'static str,
    pub category: String,
    pub tags: Vec<&'static str>,
    pub places: u32,
    pub salary: &'static str,
    pub desc: String,
    pub color: &'static str,
    pub quiz_cat: &'static str,
    pub url: String,
}

impl ProgramCard {
    pub fn from_record(record: &ProgramRecord) -> Self {
        let non_empty = |s: &str, default: &str| {
            if s.is_empty() {
                default.to_string()
            } else {
                s.to_string()
            }
        };

        Self {
            title: non_empty(&record.program_name, "Без названия"),
            fgos_code: non_empty(&record.fgos_code, "—"),
            fgos_name: record.macrogroup_name.clone(),
            institution: non_empty(&record.institution_name, "Не указан"),
            district: non_empty(&record.region, "РФ"),
            level: record.education_level.tag(),
            level_readable: record.education_level.readable(),
            base: "11 классов",
            duration: "4 года",
            category: non_empty(&record.macrogroup_name, "Общее"),
            tags: vec!["Бюджет"],
            places: record.budget_seats,
            salary: "по итогам",
            desc: non_empty(&record.macrogroup_name, "Описание программы загружается..."),
            color: "blue",
            quiz_cat: "Tech",
            url: record.url.clone(),
        }
    }
}

/// Reads delimited rows with a header line into column-name → value maps.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, EmitError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Local-file variant. A missing file is the pipeline's one fatal input
/// condition.
pub fn read_rows_from_path(path: &Path) -> Result<Vec<RawRow>, EmitError> {
    if !path.exists() {
        return Err(EmitError::MissingInput(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    read_rows(file)
}

/// Remote variant: fetches a CSV export over HTTP.
pub async fn fetch_rows(client: &reqwest::Client, url: &str) -> Result<Vec<RawRow>, EmitError> {
    log::info!("Fetching CSV export from {}", url);
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    read_rows(body.as_bytes())
}

/// Normalizes rows, skipping invalid ones with a warning. Never fails: the
/// result may simply be empty.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<ProgramRecord> {
    let mut records = Vec::new();
    for row in rows {
        match normalize_row(row) {
            Ok(record) => records.push(record),
            Err(e @ NormalizeError::MissingRequired(_)) => {
                log::warn!("Skipping row: {}", e);
            }
        }
    }
    records
}

/// Escapes HTML-reserved characters for safe embedding in markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the JS array literal: a generation-date comment followed by
/// `const programsFromCSV = [...]`. String escaping is JSON's, which is safe
/// inside a script block.
pub fn render_js(records: &[ProgramRecord], date: NaiveDate) -> Result<String, EmitError> {
    let cards: Result<Vec<String>, serde_json::Error> = records
        .iter()
        .map(|r| serde_json::to_string(&ProgramCard::from_record(r)))
        .collect();

    Ok(format!(
        "// Сгенерировано автоматически {}\nconst programsFromCSV = [\n{}\n];\n",
        date.format("%d.%m.%Y"),
        cards?.join(",\n")
    ))
}

/// Renders the HTML card fragment. Every interpolated field is escaped.
pub fn render_html(records: &[ProgramRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let card = ProgramCard::from_record(record);
        // Writing to a String cannot fail.
        let _ = writeln!(out, "<div class=\"program-card\">");
        let _ = writeln!(
            out,
            "  <h3 class=\"program-title\">{}</h3>",
            escape_html(&card.title)
        );
        let _ = writeln!(
            out,
            "  <p class=\"program-desc\">{}</p>",
            escape_html(&card.desc)
        );
        let _ = writeln!(
            out,
            "  <span class=\"program-level\">{}</span>",
            escape_html(card.level_readable)
        );
        let _ = writeln!(
            out,
            "  <p class=\"program-meta\">{} — {} — {} бюджетных мест</p>",
            escape_html(&card.institution),
            escape_html(&card.district),
            card.places
        );
        let _ = writeln!(
            out,
            "  <a class=\"program-link\" href=\"{}\">Подробнее</a>",
            escape_html(&card.url)
        );
        let _ = writeln!(out, "</div>");
    }
    out
}

/// Runs the tail of the transform pipeline: normalize, render, write.
///
/// Returns `None` (and writes nothing) when no row produced a valid record,
/// per the "no output file on empty result" policy.
pub fn transform_rows(
    rows: &[RawRow],
    format: ArtifactFormat,
    output: &Path,
    date: NaiveDate,
) -> Result<Option<usize>, EmitError> {
    let records = normalize_rows(rows);
    if records.is_empty() {
        log::info!("No valid records in input, output file not written");
        return Ok(None);
    }

    let artifact = match format {
        ArtifactFormat::Js => render_js(&records, date)?,
        ArtifactFormat::Html => render_html(&records),
    };
    std::fs::write(output, artifact)?;
    log::info!(
        "Generated {} program(s) into {}",
        records.len(),
        output.display()
    );
    Ok(Some(records.len()))
}
