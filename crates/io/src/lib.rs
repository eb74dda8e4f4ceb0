// Roster files in, verdict reports and checkpoints out

pub mod checkpoint;
pub mod csv;
pub mod error;
pub mod report;
pub mod roster;

pub use checkpoint::{checkpoint_path, Checkpoint};
pub use error::IoError;
pub use report::{ReportFormat, ReportWriter};
pub use roster::{load_external, load_registry, LoadOptions, Roster};
