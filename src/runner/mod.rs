pub mod batch;
pub mod executor;
pub mod reporter;
pub mod types;

pub use batch::{BatchRunner, ExecutionMode};
pub use executor::{ApiExecutor, ExecuteOptions};
pub use reporter::Reporter;
pub use types::{BatchSummary, FileReport, OutcomeKind, RequestOutcome};
