pub mod demographic;
pub mod error;
pub mod measure;
pub mod ops;
pub mod score;
pub mod visits;

pub use demographic::{DemographicField, DemographicOp, DemographicValue};
pub use error::{DeriveError, Result};
pub use measure::{
    AdjustmentRule, KeyColumn, MeasureBuilder, MeasureDefinition, PageSplitRule, SourceSpec,
    SubScale, columns, merge_key, standard_key,
};
pub use ops::{ItemTransform, Reducer};
pub use score::{ScoreRow, long};
pub use visits::{VISIT_ORDER, Visit};
