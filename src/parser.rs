use scraper::{ElementRef, Html, Selector};

use crate::normalize::{extract_budget_seats, is_government_institution, region_from_url};
use crate::types::{EducationLevel, ProgramRecord};

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(element: ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .map(|e| normalize_whitespace(&elem_text(e)))
        .find(|t| !t.is_empty())
}

fn resolve_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}

/// Parses one listing-site results page into program records.
///
/// Both listing sites render program cards as blocks with loosely named CSS
/// classes, so the selectors match on class substrings rather than exact
/// names. Cards missing a program or institution name are skipped, and the
/// result is filtered down to state institutions with a positive budget-seat
/// count.
pub fn parse_program_listing(
    html: &str,
    base_url: &str,
    fgos_code: &str,
    macrogroup_id: &str,
    macrogroup_name: &str,
    level: EducationLevel,
) -> Vec<ProgramRecord> {
    let document = Html::parse_document(html);

    let card_selector = Selector::parse(
        "div[class*='program'], div[class*='speciality'], div[class*='vuz'], \
         div[class*='college'], div[class*='item'], article",
    )
    .unwrap();
    let name_selector =
        Selector::parse("[class*='title'], [class*='name'], [class*='program'], h2, h3").unwrap();
    let institution_selector =
        Selector::parse("[class*='institution'], [class*='university'], [class*='college'], h4")
            .unwrap();
    let budget_selector =
        Selector::parse("[class*='budget'], [class*='places'], [class*='kcp']").unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();

    let mut programs = Vec::new();

    for card in document.select(&card_selector) {
        let Some(program_name) = first_text(card, &name_selector) else {
            continue;
        };
        let Some(institution_name) = first_text(card, &institution_selector) else {
            continue;
        };

        if !is_government_institution(&institution_name) {
            log::debug!("Skipping non-state institution: {}", institution_name);
            continue;
        }

        let budget_seats = first_text(card, &budget_selector)
            .map(|t| extract_budget_seats(&t))
            .unwrap_or(0);
        if budget_seats == 0 {
            continue;
        }

        let url = card
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| resolve_url(base_url, href))
            .unwrap_or_default();
        if url.is_empty() {
            continue;
        }

        programs.push(ProgramRecord {
            id: 0,
            macrogroup_id: macrogroup_id.to_string(),
            macrogroup_name: macrogroup_name.to_string(),
            education_level: level,
            fgos_code: fgos_code.to_string(),
            program_name,
            institution_name,
            region: region_from_url(&url),
            budget_seats,
            url,
        });
    }

    programs
}
