//! Snapshot-based undo/redo history for any state container.
//!
//! A `History` records full snapshots of a container's state in `past` and
//! `future` sequences and moves between them on undo/redo. Recording can be
//! shaped by grouping, filtering and a throttle window. `Tracked` binds a
//! history to a container so that every state replacement is recorded.

pub mod clock;
pub mod config;
pub mod container;
pub mod history;
pub mod modifiers;
pub mod stack;
pub mod tracked;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::HistoryConfig;
pub use container::{StateContainer, Store};
pub use history::History;
pub use modifiers::Modifiers;
pub use stack::SnapshotStack;
pub use tracked::Tracked;
