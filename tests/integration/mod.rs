//! Integration test modules

pub mod literal_properties;
pub mod pipeline_run;
pub mod progress_resume;
pub mod result_store;
pub mod source_finder;
pub mod test_utils;
