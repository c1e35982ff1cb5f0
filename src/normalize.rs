//! Record normalization: maps one raw input row (column name → raw string)
//! into one canonical [`ProgramRecord`]. Pure functions, no side effects.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{EducationLevel, ProgramRecord};

/// One raw input row, keyed by column name. All keys optional except
/// `program_name` and `url`.
pub type RawRow = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingRequired(Vec<String>),
}

static RE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("invalid regex: digits"));

/// Keywords marking a state institution (lowercase).
const GOV_KEYWORDS: &[&str] = &[
    "государственный",
    "федеральный",
    "национальный",
    "российский",
    "рф",
    "р.ф.",
    "министерство",
    "мвд",
    "мчс",
];

/// Keywords marking the presence of budget-funded seats (lowercase).
const BUDGET_KEYWORDS: &[&str] = &["бюджет", "кцп", "целевое", "грант"];

fn field<'a>(row: &'a RawRow, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("").trim()
}

/// Maps a raw row into a canonical record.
///
/// Only `program_name` and `url` are required (non-blank after trimming);
/// rejection names every missing one. All other fields fall back to
/// placeholder defaults. The record id is left at 0 and assigned after
/// deduplication.
pub fn normalize_row(row: &RawRow) -> Result<ProgramRecord, NormalizeError> {
    let missing: Vec<String> = ["program_name", "url"]
        .iter()
        .filter(|key| field(row, key).is_empty())
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(NormalizeError::MissingRequired(missing));
    }

    let url = field(row, "url").to_string();
    let region = match field(row, "region") {
        "" => region_from_url(&url),
        raw => standardize_region(raw),
    };

    Ok(ProgramRecord {
        id: 0,
        macrogroup_id: field(row, "macrogroup_id").to_string(),
        macrogroup_name: field(row, "macrogroup_name").to_string(),
        education_level: EducationLevel::from_text(field(row, "education_level")),
        fgos_code: field(row, "fgos_code").to_string(),
        program_name: field(row, "program_name").to_string(),
        institution_name: field(row, "institution_name").to_string(),
        region,
        budget_seats: extract_budget_seats(field(row, "budget_seats")),
        url,
    })
}

/// Best-effort seat count from free text: the first run of decimal digits
/// found anywhere in the string; sentinel 1 when only an affirmative budget
/// phrase is present; else 0. Multi-number text ("15 мест, из них 5 целевых")
/// silently takes the first number.
pub fn extract_budget_seats(text: &str) -> u32 {
    if let Some(m) = RE_DIGITS.find(text) {
        return m.as_str().parse().unwrap_or(0);
    }
    if has_budget_places(text) { 1 } else { 0 }
}

/// Affirmative budget-phrase heuristic ("Есть бюджетные места", "КЦП", ...).
pub fn has_budget_places(text: &str) -> bool {
    let lower = text.to_lowercase();
    BUDGET_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Case-insensitive keyword check for state institutions.
pub fn is_government_institution(name: &str) -> bool {
    let lower = name.to_lowercase();
    GOV_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Extracts a region from URL path markers, defaulting to the country-level
/// placeholder. Only the few regions the listing sites encode in their URLs
/// are recognized.
pub fn region_from_url(url: &str) -> String {
    let lower = url.to_lowercase();
    // Strip the scheme and host so "moscow" in a domain name does not match.
    let path = lower
        .splitn(4, '/')
        .nth(3)
        .unwrap_or("");

    for part in path.split('/') {
        if part.contains("moscow") || part.contains("москва") {
            return "Москва".to_string();
        }
        if part.contains("spb") || part.contains("санкт-петербург") || part.contains("питер") {
            return "Санкт-Петербург".to_string();
        }
        if part.contains("novosibirsk") || part.contains("новосибирск") {
            return "Новосибирск".to_string();
        }
    }
    "Россия".to_string()
}

/// Strips redundant country prefixes from a region name.
pub fn standardize_region(region: &str) -> String {
    region
        .replace("Российская Федерация, ", "")
        .replace("Россия, ", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn normalizes_full_row() {
        let row = row(&[
            ("program_name", "Физика"),
            ("url", "http://x.ru"),
            ("budget_seats", "15 мест"),
            ("education_level", "Высшее"),
            ("institution_name", "МГУ"),
            ("region", "Москва"),
            ("fgos_code", "03.03.02"),
        ]);
        let record = normalize_row(&row).unwrap();
        assert_eq!(record.program_name, "Физика");
        assert_eq!(record.budget_seats, 15);
        assert_eq!(record.education_level, EducationLevel::Vo);
        assert_eq!(record.education_level.tag(), "VO");
        assert_eq!(record.region, "Москва");
    }

    #[test]
    fn rejects_rows_missing_required_fields() {
        let err = normalize_row(&row(&[("program_name", "Физика")])).unwrap_err();
        assert_eq!(err.to_string(), "missing required field(s): url");

        let err = normalize_row(&row(&[("url", "  "), ("budget_seats", "10")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required field(s): program_name, url"
        );
    }

    #[test]
    fn normalizer_is_idempotent() {
        let row = row(&[
            ("program_name", "Экономика"),
            ("url", "http://y.ru"),
            ("region", "Россия, Казань"),
        ]);
        let first = normalize_row(&row).unwrap();
        let second = normalize_row(&row).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.region, "Казань");
    }

    #[test]
    fn seat_extraction_takes_first_digit_run() {
        assert_eq!(extract_budget_seats("20 бюджетных мест"), 20);
        assert_eq!(extract_budget_seats("15 мест, из них 5 целевых"), 15);
        assert_eq!(extract_budget_seats("Есть бюджетные места"), 1);
        assert_eq!(extract_budget_seats("КЦП утверждены"), 1);
        assert_eq!(extract_budget_seats(""), 0);
        assert_eq!(extract_budget_seats("платное обучение"), 0);
    }

    #[test]
    fn government_keyword_heuristic() {
        assert!(is_government_institution(
            "Московский государственный университет"
        ));
        assert!(is_government_institution("Уральский федеральный университет"));
        assert!(is_government_institution("Академия МВД"));
        assert!(!is_government_institution("Частный институт дизайна"));
    }

    #[test]
    fn region_from_url_markers() {
        assert_eq!(region_from_url("https://vuzopedia.ru/vuz/123-moscow-state"), "Москва");
        assert_eq!(region_from_url("https://postupi.online/vuz/spb/"), "Санкт-Петербург");
        assert_eq!(region_from_url("https://nsu.ru/novosibirsk/program"), "Новосибирск");
        assert_eq!(region_from_url("https://kpfu.ru/program/1"), "Россия");
        // A host-only match must not count as a region marker.
        assert_eq!(region_from_url("https://moscow-college.example"), "Россия");
    }

    #[test]
    fn region_standardization_strips_country_prefix() {
        assert_eq!(standardize_region("Россия, Екатеринбург"), "Екатеринбург");
        assert_eq!(
            standardize_region("Российская Федерация, Самара"),
            "Самара"
        );
        assert_eq!(standardize_region(" Казань "), "Казань");
    }
}
