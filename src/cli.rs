use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_CV_PATH: &str = "cv.yaml";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "cv-tailor",
    version,
    about = "Tailor a YAML CV to a job description and export it as a one-page PDF"
)]
pub struct Cli {
    #[arg(long, default_value = DEFAULT_CV_PATH, help = "CV file (YAML)")]
    pub cv: PathBuf,
    #[arg(
        long,
        conflicts_with = "jd_url",
        help = "Previously extracted job description (JSON)"
    )]
    pub jd: Option<PathBuf>,
    #[arg(long, help = "Job description URL to scrape")]
    pub jd_url: Option<String>,
    #[arg(long, help = "Output file name, without extension")]
    pub out: Option<String>,
    #[arg(long, default_value_t = false, help = "Skip tailoring and export the CV as is")]
    pub generate_only: bool,
    #[arg(long, default_value_t = false, help = "Accept output spanning more than one page")]
    pub allow_multipage: bool,
    #[arg(long, default_value_t = false, help = "Accept every tailored section without review")]
    pub accept_all: bool,
    #[arg(long, default_value_t = false, help = "Show the browser while scraping")]
    pub visualise_scraping: bool,
    #[arg(long, default_value_t = false, help = "Also write the final HTML next to the PDF")]
    pub emit_html: bool,
    #[arg(long, help = "Config file (TOML), defaults to cv-tailor.toml when present")]
    pub config: Option<PathBuf>,
}
