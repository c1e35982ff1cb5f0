use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Education level of a program, detected from free text by the presence of
/// the "СПО" marker (vocational college). Everything else is treated as
/// higher education.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "Высшее")]
    Vo,
    #[serde(rename = "СПО")]
    Spo,
}

impl EducationLevel {
    pub fn from_text(text: &str) -> Self {
        if text.contains("СПО") {
            EducationLevel::Spo
        } else {
            EducationLevel::Vo
        }
    }

    /// Short machine tag used by the site frontend.
    pub fn tag(&self) -> &'static str {
        match self {
            EducationLevel::Vo => "VO",
            EducationLevel::Spo => "SPO",
        }
    }

    /// Human-readable label for program cards.
    pub fn readable(&self) -> &'static str {
        match self {
            EducationLevel::Vo => "Бакалавриат",
            EducationLevel::Spo => "Колледж",
        }
    }
}

impl Display for EducationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EducationLevel::Vo => write!(f, "Высшее"),
            EducationLevel::Spo => write!(f, "СПО"),
        }
    }
}

/// One educational program with budget-funded admission seats.
///
/// A record is only constructed when both `program_name` and `url` are
/// non-blank; every other field degrades to a documented default instead of
/// rejecting the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRecord {
    /// 1-based sequential id, assigned after deduplication.
    pub id: u32,
    pub macrogroup_id: String,
    pub macrogroup_name: String,
    pub education_level: EducationLevel,
    pub fgos_code: String,
    pub program_name: String,
    pub institution_name: String,
    pub region: String,
    pub budget_seats: u32,
    pub url: String,
}

impl ProgramRecord {
    /// Deduplication key: records identical in these three fields are
    /// considered the same program.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.fgos_code.clone(),
            self.institution_name.clone(),
            self.program_name.clone(),
        )
    }
}

impl Display for ProgramRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} — {} ({}, {} бюджетных мест)",
            self.fgos_code, self.program_name, self.institution_name, self.region, self.budget_seats
        )
    }
}

/// A named cluster of related specialty codes from the target list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macrogroup {
    pub name: String,
    #[serde(default)]
    pub vo_codes: Vec<String>,
    #[serde(default)]
    pub spo_codes: Vec<String>,
}

/// Target list mapping macro-group id to its display name and specialty
/// codes. `BTreeMap` keeps iteration order stable across runs.
pub type TargetList = BTreeMap<String, Macrogroup>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_detected_by_spo_marker() {
        assert_eq!(EducationLevel::from_text("СПО"), EducationLevel::Spo);
        assert_eq!(
            EducationLevel::from_text("Среднее профессиональное (СПО)"),
            EducationLevel::Spo
        );
        assert_eq!(EducationLevel::from_text("Высшее"), EducationLevel::Vo);
        assert_eq!(EducationLevel::from_text(""), EducationLevel::Vo);
    }

    #[test]
    fn level_serializes_as_russian_label() {
        let json = serde_json::to_string(&EducationLevel::Spo).unwrap();
        assert_eq!(json, "\"СПО\"");
        let json = serde_json::to_string(&EducationLevel::Vo).unwrap();
        assert_eq!(json, "\"Высшее\"");
    }

    #[test]
    fn target_list_parses_with_missing_code_lists() {
        let json = r#"{
            "1": { "name": "Информатика", "vo_codes": ["09.03.01"] },
            "2": { "name": "Энергетика", "spo_codes": ["13.02.01"] }
        }"#;
        let list: TargetList = serde_json::from_str(json).unwrap();
        assert_eq!(list["1"].vo_codes, vec!["09.03.01"]);
        assert!(list["1"].spo_codes.is_empty());
        assert_eq!(list["2"].spo_codes, vec!["13.02.01"]);
    }
}
