pub mod logging;

pub use logging::{spinner, truncate_text};
