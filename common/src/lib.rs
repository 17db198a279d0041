//! Specimen Label Check Common Library
//!
//! ラベル照合ロジックと、CLIから使う共有型

pub mod catalog;
pub mod detection;
pub mod edit_distance;
pub mod error;
pub mod matcher;
pub mod types;

pub use catalog::{Catalog, CatalogRow};
pub use detection::{parse_detector_response, select_primary, Detection, Roi};
pub use edit_distance::levenshtein;
pub use error::{Error, Result};
pub use matcher::{candidate_lines, match_label, NameCorpus};
pub use types::{BatchSummary, ErrorRecord, LabelReport, MatchResult, MatchStage};
