pub mod adjuster;
pub mod case_file;
pub mod cli_args;
pub mod config;
pub mod error;
pub mod export;
pub mod injury;
pub mod logging;
pub mod match_context;
pub mod model;
pub mod report;
pub mod store;

pub use adjuster::{AdjusterConfig, InjuryAdjuster, adjust_for_injury, compute_confidence};
pub use error::{AdjustError, Result};
pub use injury::{InjuryAssessment, InjuryRecord};
pub use match_context::{InMemoryMatches, MatchContext};
pub use report::{AdjustmentReport, ProbabilityPair};
