pub mod cv;
pub mod job;
pub mod loaders;
pub mod page;
pub mod tailored;
pub mod validation;

pub use cv::{Contact, ContactType, Cv, Education, Extras, WorkExperience};
pub use job::{AtsType, JdLanguage, JobDescription, StructuredJob};
pub use loaders::{load_cv, load_job_description, parse_cv};
pub use page::{PageDimensions, PageMeasurement};
pub use tailored::{
    ResponseId, ScoredAchievement, ScoredStackItem, StructuredResponse, TailoredCv,
    TailoredFragment, TailoredProfile, TailoredTitles, TailoredWorkExperience,
};
pub use validation::{format_report, validate_cv_value};
