//! Scrawl Core Library
//!
//! In-memory room, presence and operation-history state for the Scrawl
//! collaborative whiteboard server. Nothing here performs I/O; every
//! transition is a fast, synchronous mutation of owned state.

pub mod history;
pub mod operation;
pub mod palette;
pub mod room;
pub mod time;

pub use history::OperationLog;
pub use operation::{Author, Operation, OperationId, OperationKind, StrokeData, StrokePoint};
pub use palette::{MEMBER_COLORS, Palette};
pub use room::{Cursor, Member, Room};
