mod traits;
mod scrape;

pub use traits::*;
pub use scrape::{html_to_text, ScrapeWebsiteTool};
