pub mod layout;
pub mod operation;
pub mod records;

pub use layout::StateLayout;
pub use operation::OperationStore;
pub use records::{FileRecordStore, RecordStore};
