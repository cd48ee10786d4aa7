pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod namespace;
pub mod time;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use namespace::{ReservedBranch, ReservedKind};
pub use types::{DependencyRecord, OperationAction, OperationPhase, OperationState};
