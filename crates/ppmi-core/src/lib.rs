pub mod assemble;
pub mod biospecimen;
pub mod datscan;
pub mod dates;
pub mod demographics;
pub mod derive;
pub mod pipeline;
pub mod reconcile;

pub use assemble::{TieBreak, pivot_wide, to_long_frame};
pub use biospecimen::{
    ASSAY_FILE, COLLECTION_FILE, available_biospecimen, default_panel, load_biospecimen,
    sanitize_test_name,
};
pub use datscan::{SCAN_FILE, available_datscan, load_datscan};
pub use dates::{DEFAULT_DATE_FILES, VisitDates, parse_date, parse_info_date, parse_iso_date};
pub use demographics::{DemographicsOutcome, derive_demographics};
pub use derive::derive_measure;
pub use pipeline::{
    BehaviorOutcome, MeasureSummary, PipelineOptions, SkippedMeasure, derive_behavior,
};
pub use reconcile::{apply_adjustments, apply_page_splits};
