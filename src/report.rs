//! Human-readable summary of a collection run: per-source, per-macro-group,
//! per-level, region and budget-seat breakdowns.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::scraper::SourceTier;
use crate::types::{ProgramRecord, TargetList};

/// Per-source record counters, owned by the single collection run.
#[derive(Debug, Default, Clone)]
pub struct SourceStats {
    counts: BTreeMap<&'static str, usize>,
}

impl SourceStats {
    pub fn new() -> Self {
        let counts = SourceTier::ORDER.iter().map(|t| (t.name(), 0)).collect();
        Self { counts }
    }

    pub fn add(&mut self, tier: SourceTier, records: usize) {
        *self.counts.entry(tier.name()).or_insert(0) += records;
    }

    pub fn count(&self, tier: SourceTier) -> usize {
        self.counts.get(tier.name()).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(name, count)| (*name, *count))
    }
}

impl std::fmt::Display for SourceStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, count) in self.iter() {
            writeln!(f, "  {}: {}", name, count)?;
        }
        Ok(())
    }
}

fn count_by<K: Ord>(
    records: &[ProgramRecord],
    key: impl Fn(&ProgramRecord) -> K,
) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}

fn top_entries<K: Ord + Clone>(counts: &BTreeMap<K, usize>, limit: usize) -> Vec<(K, usize)> {
    let mut entries: Vec<_> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(limit);
    entries
}

/// Renders the plain-text collection report. Macro-groups from the target
/// list with no collected programs are also warned about in the log.
pub fn generate_report(
    records: &[ProgramRecord],
    stats: &SourceStats,
    target_list: &TargetList,
) -> String {
    let mut out = String::new();
    let line = "=".repeat(50);

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", line);
    let _ = writeln!(out, "ОТЧЕТ О СБОРЕ ОБРАЗОВАТЕЛЬНЫХ ПРОГРАММ");
    let _ = writeln!(out, "{}", line);
    let _ = writeln!(out, "Общее количество собранных программ: {}", records.len());
    let _ = writeln!(out);

    let _ = writeln!(out, "Распределение по источникам:");
    let _ = write!(out, "{}", stats);
    let _ = writeln!(out);

    let _ = writeln!(out, "Распределение по макрогруппам:");
    let by_macrogroup = count_by(records, |r| r.macrogroup_id.clone());
    for (mg_id, count) in &by_macrogroup {
        let name = target_list
            .get(mg_id)
            .map(|mg| mg.name.as_str())
            .unwrap_or("Неизвестно");
        let _ = writeln!(out, "  {} - {}: {}", mg_id, name, count);
    }
    let _ = writeln!(out);

    let missing: Vec<&String> = target_list
        .keys()
        .filter(|id| !by_macrogroup.contains_key(*id))
        .collect();
    if !missing.is_empty() {
        log::warn!("No programs collected for macro-groups: {:?}", missing);
    }

    let _ = writeln!(out, "Распределение по уровням образования:");
    for (level, count) in count_by(records, |r| r.education_level.to_string()) {
        let _ = writeln!(out, "  {}: {}", level, count);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Распределение по регионам (топ-10):");
    let by_region = count_by(records, |r| r.region.clone());
    for (region, count) in top_entries(&by_region, 10) {
        let _ = writeln!(out, "  {}: {}", region, count);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Статистика по бюджетным местам:");
    let by_seats = count_by(records, |r| r.budget_seats);
    for (seats, count) in top_entries(&by_seats, 10) {
        let _ = writeln!(out, "  {} мест: {} программ", seats, count);
    }

    out
}
