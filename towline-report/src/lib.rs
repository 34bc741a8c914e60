//! # Towline Report System
//!
//! Delivers a frozen [`towline_engine::RunOutcome`] to one or more
//! destinations: a human-readable console summary and a JSON artifact on
//! the filesystem. Destinations implement [`ReportDestination`]; the
//! [`Reporter`] fans one outcome out to all of them.

pub mod destination;
pub mod destinations;
pub mod error;
pub mod render;

pub use destination::{ReportDestination, Reporter};
pub use destinations::{ConsoleDestination, FilesystemDestination};
pub use error::{ReportError, ReportResult};
pub use render::render_summary;
