use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::parser::parse_program_listing;
use crate::synthetic;
use crate::types::{EducationLevel, ProgramRecord};

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
}

/// Source tiers in fixed fallback order: primary listing site, secondary
/// listing site, then the canned placeholder generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTier {
    Vuzopedia,
    PostupiOnline,
    Synthetic,
}

impl SourceTier {
    pub const ORDER: [SourceTier; 3] = [
        SourceTier::Vuzopedia,
        SourceTier::PostupiOnline,
        SourceTier::Synthetic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceTier::Vuzopedia => "vuzopedia",
            SourceTier::PostupiOnline => "postupi_online",
            SourceTier::Synthetic => "synthetic",
        }
    }

    /// Whether fetching from this tier performs an external request.
    pub fn is_remote(&self) -> bool {
        !matches!(self, SourceTier::Synthetic)
    }
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    vuzopedia_base: String,
    postupi_base: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            vuzopedia_base: crate::VUZOPEDIA_BASE_URL.to_string(),
            postupi_base: crate::POSTUPI_BASE_URL.to_string(),
        })
    }

    /// Same client setup against alternate listing hosts (mirrors, tests).
    pub fn with_base_urls(
        vuzopedia_base: String,
        postupi_base: String,
    ) -> Result<Self, ScraperError> {
        let mut scraper = Self::new()?;
        scraper.vuzopedia_base = vuzopedia_base;
        scraper.postupi_base = postupi_base;
        Ok(scraper)
    }

    /// Fetches program records for one specialty code from one source tier.
    /// The synthetic tier never fails and never touches the network.
    pub async fn fetch_programs(
        &self,
        tier: SourceTier,
        fgos_code: &str,
        macrogroup_id: &str,
        macrogroup_name: &str,
        level: EducationLevel,
    ) -> Result<Vec<ProgramRecord>, ScraperError> {
        match tier {
            SourceTier::Vuzopedia => {
                self.fetch_vuzopedia(fgos_code, macrogroup_id, macrogroup_name, level)
                    .await
            }
            SourceTier::PostupiOnline => {
                self.fetch_postupi(fgos_code, macrogroup_id, macrogroup_name, level)
                    .await
            }
            SourceTier::Synthetic => Ok(synthetic::fallback_programs(
                fgos_code,
                macrogroup_id,
                macrogroup_name,
                level,
            )),
        }
    }

    async fn fetch_vuzopedia(
        &self,
        fgos_code: &str,
        macrogroup_id: &str,
        macrogroup_name: &str,
        level: EducationLevel,
    ) -> Result<Vec<ProgramRecord>, ScraperError> {
        let section = match level {
            EducationLevel::Vo => "vuzi",
            EducationLevel::Spo => "colledges",
        };
        // Vuzopedia keys its search on the code with the dots removed.
        let url = format!(
            "{}/{}?speciality={}",
            self.vuzopedia_base,
            section,
            fgos_code.replace('.', "")
        );
        log::info!("Fetching vuzopedia listing for {}: {}", fgos_code, url);
        let html = self.get_html(&url).await?;
        Ok(parse_program_listing(
            &html,
            &self.vuzopedia_base,
            fgos_code,
            macrogroup_id,
            macrogroup_name,
            level,
        ))
    }

    async fn fetch_postupi(
        &self,
        fgos_code: &str,
        macrogroup_id: &str,
        macrogroup_name: &str,
        level: EducationLevel,
    ) -> Result<Vec<ProgramRecord>, ScraperError> {
        let url = match level {
            EducationLevel::Vo => {
                format!("{}/vuzi/?speciality={}", self.postupi_base, fgos_code)
            }
            EducationLevel::Spo => {
                format!("{}/specialnosti/?code={}", self.postupi_base, fgos_code)
            }
        };
        log::info!("Fetching postupi.online listing for {}: {}", fgos_code, url);
        let html = self.get_html(&url).await?;
        Ok(parse_program_listing(
            &html,
            &self.postupi_base,
            fgos_code,
            macrogroup_id,
            macrogroup_name,
            level,
        ))
    }

    async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_order_terminates_at_synthetic() {
        let last = SourceTier::ORDER.last().unwrap();
        assert_eq!(*last, SourceTier::Synthetic);
        assert!(!last.is_remote());
        assert!(SourceTier::ORDER[..2].iter().all(|t| t.is_remote()));
    }

    #[tokio::test]
    async fn synthetic_tier_needs_no_network() {
        let scraper = WebScraper::new().unwrap();
        let programs = scraper
            .fetch_programs(
                SourceTier::Synthetic,
                "09.03.01",
                "1",
                "Информатика",
                EducationLevel::Vo,
            )
            .await
            .unwrap();
        assert!(!programs.is_empty());
        assert!(programs.iter().all(|p| p.budget_seats > 0));
    }
}
