pub mod jd_extractor;
pub mod llm_service;
pub mod output_writer;
pub mod page_measurer;
pub mod prompts;
pub mod renderer;
pub mod scraper;
pub mod tailor_service;

pub use jd_extractor::JdExtractor;
pub use llm_service::{LlmService, StructuredRequest};
pub use output_writer::{generate_file_name, OutputFormat, OutputWriter};
pub use page_measurer::{ChromeMeasurer, PageMeasurer};
pub use renderer::{HtmlRenderer, MarkupRenderer};
pub use scraper::{extract_text_from_html, scrape_url};
pub use tailor_service::{CvTailor, TailorService};
