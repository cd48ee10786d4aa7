pub mod export;
pub mod graph;
pub mod manage;
pub mod orchestrator;
pub mod resume;
pub mod status;
pub mod update;

pub use export::ExportReport;
pub use graph::{Branch, BranchGraph, BranchId, Hydration, ManagedLinks};
pub use manage::{BranchSummary, RebaseTipSource, normalize_reference};
pub use orchestrator::Orchestrator;
pub use status::{BranchStatus, DependencyStatus, StatusOptions, StatusReport};
pub use update::{UpdateOptions, UpdateOutcome};
