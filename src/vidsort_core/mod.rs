pub mod cli;
pub mod error;
pub mod group;
pub mod media;
pub mod organize;
pub mod parser;
pub mod plan;
pub mod undo;

pub use cli::{Cli, Commands};
pub use error::{Result, VidsortError};
pub use group::{FileGroup, SidecarFile, group_entries};
pub use media::FileKind;
pub use organize::{
    BatchState, CancelToken, OrganizeReport, Organizer, ScanReport, UndoReport,
    title_case_children, title_case_folder,
};
pub use parser::{MediaItem, title_case};
pub use plan::{OpKind, Plan, PlanOptions, PlannedOperation};
pub use undo::{UndoRecord, UndoStore};
