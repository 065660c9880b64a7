pub mod cv_loader;

pub use cv_loader::{load_cv, load_job_description, parse_cv};
