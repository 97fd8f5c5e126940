//! Rolling menu overlay engine.
//!
//! This crate holds the state-synchronization and row-grouping core behind
//! the overlay server:
//! - Loading the source workbook (`.xlsx`) into an immutable [`Table`]
//! - The mutable [`StateStore`] with its monotonic version counter
//! - Grouping-spec parsing and row projection
//! - Payload assembly for the overlay page
//! - On-disk presets and the per-connection version watcher
//!
//! # Quick Start
//!
//! ```ignore
//! use rollmenu::{StateStore, assemble, open_table};
//!
//! let table = open_table("data/data.xlsx")?;
//! let store = StateStore::new(table.columns().to_vec());
//! let payload = assemble(&table, &store.snapshot());
//! ```

mod container;
mod excel;
mod group_spec;
mod notify;
mod payload;
mod preset;
mod rows;
mod sheet;
mod state;
mod table;

pub use container::{ContainerError, ContainerLimits, XlsxContainer};
pub use excel::{OpenError, open_table, read_table};
pub use group_spec::parse_group_spec;
pub use notify::{DEFAULT_POLL_INTERVAL, VersionWatcher};
pub use payload::{OverlayPayload, assemble};
pub use preset::{PresetError, PresetStore};
pub use rows::{Row, grouped_rows};
pub use sheet::SheetParseError;
pub use state::{OverlayState, StateStore};
pub use table::{Table, Value};
