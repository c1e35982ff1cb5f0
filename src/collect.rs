//! Collection pipeline: walks the target list, tries source tiers in order
//! per specialty code, stops early once enough records are gathered, then
//! deduplicates and writes the aggregate out.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use tokio::time::sleep;

use crate::report::SourceStats;
use crate::scraper::{SourceTier, WebScraper};
use crate::types::{EducationLevel, ProgramRecord, TargetList};

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Target list not found or unreadable at {path}: {source}")]
    TargetListIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse target list: {0}")]
    TargetListJson(#[from] serde_json::Error),
    #[error("Failed to write output: {0}")]
    OutputIo(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Early-exit threshold: the run stops adding specialty codes once the
    /// aggregate reaches this count.
    pub min_programs: usize,
    /// Politeness pause between consecutive external requests.
    pub request_delay: Duration,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            min_programs: 50,
            request_delay: Duration::from_secs(2),
        }
    }
}

/// Loading the target list is the one fatal input condition of the pipeline.
pub fn load_target_list(path: &Path) -> Result<TargetList, CollectError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CollectError::TargetListIo {
        path: path.display().to_string(),
        source,
    })?;
    let list = serde_json::from_str(&raw)?;
    log::info!("Target list loaded from {}", path.display());
    Ok(list)
}

/// Single-run accumulator: collected records plus per-source counters, owned
/// exclusively by the run.
#[derive(Debug)]
pub struct Collector {
    scraper: WebScraper,
    records: Vec<ProgramRecord>,
    stats: SourceStats,
}

impl Collector {
    pub fn new(scraper: WebScraper) -> Self {
        Self {
            scraper,
            records: Vec::new(),
            stats: SourceStats::new(),
        }
    }

    /// Runs the full collection: every (code, level) pair in target-list
    /// order until `min_programs` records are gathered, then dedup and id
    /// assignment. Per-source failures degrade to the next tier; the run
    /// itself never fails past this point.
    pub async fn run(
        mut self,
        target_list: &TargetList,
        opts: &CollectOptions,
    ) -> (Vec<ProgramRecord>, SourceStats) {
        log::info!(
            "Collecting programs for {} macro-group(s), minimum {}",
            target_list.len(),
            opts.min_programs
        );

        'outer: for (mg_id, mg) in target_list {
            let code_sets = [
                (&mg.vo_codes, EducationLevel::Vo),
                (&mg.spo_codes, EducationLevel::Spo),
            ];
            for (codes, level) in code_sets {
                for code in codes {
                    self.collect_code(code, mg_id, &mg.name, level, opts.request_delay)
                        .await;
                    if self.records.len() >= opts.min_programs {
                        log::info!(
                            "Reached {} records, stopping collection early",
                            self.records.len()
                        );
                        break 'outer;
                    }
                }
            }
        }

        let records = dedup_records(self.records);
        log::info!("Collection finished: {} unique program(s)", records.len());
        (records, self.stats)
    }

    /// Tries the source tiers in order for one specialty code; the first
    /// tier yielding at least one record wins. Failures are logged and
    /// treated as empty results.
    async fn collect_code(
        &mut self,
        fgos_code: &str,
        macrogroup_id: &str,
        macrogroup_name: &str,
        level: EducationLevel,
        request_delay: Duration,
    ) {
        for tier in SourceTier::ORDER {
            let result = self
                .scraper
                .fetch_programs(tier, fgos_code, macrogroup_id, macrogroup_name, level)
                .await;

            if tier.is_remote() {
                sleep(request_delay).await;
            }

            match result {
                Ok(programs) if !programs.is_empty() => {
                    log::info!(
                        "{}: {} program(s) for {} ({})",
                        tier.name(),
                        programs.len(),
                        fgos_code,
                        level
                    );
                    self.stats.add(tier, programs.len());
                    self.records.extend(programs);
                    return;
                }
                Ok(_) => {
                    log::debug!("{}: no programs for {}", tier.name(), fgos_code);
                }
                Err(e) => {
                    log::warn!(
                        "{}: fetch failed for {}: {}, trying next source",
                        tier.name(),
                        fgos_code,
                        e
                    );
                }
            }
        }

        // Unreachable in practice: the synthetic tier always yields records.
        log::warn!("No source produced programs for {}", fgos_code);
    }
}

/// Deduplicates by {fgos_code, institution_name, program_name}, keeping the
/// first occurrence, then reassigns 1-based sequential ids.
pub fn dedup_records(records: Vec<ProgramRecord>) -> Vec<ProgramRecord> {
    let mut seen = HashSet::new();
    let mut unique: Vec<ProgramRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.dedup_key()))
        .collect();
    for (i, record) in unique.iter_mut().enumerate() {
        record.id = i as u32 + 1;
    }
    unique
}

/// Writes canonical records as a UTF-8 CSV with a header row.
pub fn write_records_csv(path: &Path, records: &[ProgramRecord]) -> Result<(), CollectError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    log::info!("Saved {} record(s) to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, institution: &str, name: &str, seats: u32) -> ProgramRecord {
        ProgramRecord {
            id: 0,
            macrogroup_id: "1".to_string(),
            macrogroup_name: "Информатика".to_string(),
            education_level: EducationLevel::Vo,
            fgos_code: code.to_string(),
            program_name: name.to_string(),
            institution_name: institution.to_string(),
            region: "Москва".to_string(),
            budget_seats: seats,
            url: "https://example.ru".to_string(),
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let records = vec![
            record("09.03.01", "МГУ", "Информатика", 20),
            record("09.03.01", "МГУ", "Информатика", 99),
            record("09.03.01", "СПбГУ", "Информатика", 15),
        ];
        let unique = dedup_records(records);
        assert_eq!(unique.len(), 2);
        // First occurrence wins even when later duplicates differ elsewhere.
        assert_eq!(unique[0].budget_seats, 20);
        assert_eq!(unique[1].institution_name, "СПбГУ");
    }

    #[test]
    fn dedup_reassigns_sequential_ids() {
        let records = vec![
            record("09.03.01", "МГУ", "Информатика", 20),
            record("10.03.01", "МГУ", "Безопасность", 10),
            record("09.03.01", "МГУ", "Информатика", 20),
        ];
        let unique = dedup_records(records);
        let ids: Vec<u32> = unique.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn missing_target_list_is_fatal_error() {
        let err = load_target_list(Path::new("/nonexistent/target_list.json")).unwrap_err();
        assert!(matches!(err, CollectError::TargetListIo { .. }));
    }

    #[test]
    fn malformed_target_list_is_rejected() {
        let path = std::env::temp_dir().join("eduscrape_bad_target_list.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_target_list(&path).unwrap_err();
        assert!(matches!(err, CollectError::TargetListJson(_)));
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn collector_fills_from_synthetic_tier_and_stops_early() {
        // No network in tests: remote tiers fail fast against an unroutable
        // base URL, so every code falls through to the synthetic tier.
        let mut list = TargetList::new();
        list.insert(
            "1".to_string(),
            crate::types::Macrogroup {
                name: "Информатика".to_string(),
                vo_codes: vec!["09.03.01".to_string(), "09.03.02".to_string()],
                spo_codes: vec!["09.02.07".to_string()],
            },
        );
        let opts = CollectOptions {
            min_programs: 3,
            request_delay: Duration::from_millis(0),
        };

        let scraper = WebScraper::with_base_urls(
            "http://127.0.0.1:1".to_string(),
            "http://127.0.0.1:1".to_string(),
        )
        .unwrap();
        let collector = Collector::new(scraper);
        let (records, stats) = collector.run(&list, &opts).await;

        // The first code alone reaches min_programs via the synthetic tier.
        assert!(records.len() >= 3);
        assert_eq!(stats.count(SourceTier::Vuzopedia), 0);
        assert_eq!(stats.count(SourceTier::Synthetic), records.len());
        assert!(records.iter().all(|r| r.fgos_code == "09.03.01"));
        assert_eq!(records[0].id, 1);
    }
}
