pub mod collect;
pub mod emit;
pub mod normalize;
mod parser;
pub mod report;
pub mod scraper;
pub mod synthetic;
pub mod types;

pub use scraper::WebScraper;

pub(crate) const VUZOPEDIA_BASE_URL: &str = "https://vuzopedia.ru";
pub(crate) const POSTUPI_BASE_URL: &str = "https://postupi.online";
