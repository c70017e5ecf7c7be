//! Seatsmart: turn a raw guest list into a seating plan.
//!
//! Guests come in as free text, get normalized into uniquely named records,
//! and are seated at capacity-bounded tables either automatically or by
//! moving chosen guests to a chosen table.
//!
//! # Architecture
//!
//! - **Normalize**: Parse raw text into sorted, disambiguated guests
//! - **Assign**: Fill tables left to right from scratch
//! - **Reassign**: Move selected guests to one table, capacity permitting
//! - **Session**: Apply one operation at a time and persist the result
//!
//! The engine functions never mutate their inputs; each returns a new
//! `(tables, guests)` snapshot.

mod assign;
mod config;
mod model;
mod names;
mod normalize;
mod plan;
mod reassign;
mod session;
mod store;

pub use assign::{Assignment, assign};
pub use config::{Config, ConfigError, DEFAULT_CONFIG_FILE, NamesConfig, api_key_from_env};
pub use model::{Guest, GuestId, NameOrder, Table, TableId, fold_case, numbered_tables};
pub use names::{GeminiNameGenerator, NameError, NameGenerator, parse_names};
pub use normalize::{MergeOutcome, merge, normalize, sort_by_display_name};
pub use plan::{Inconsistency, LookupMatch, SeatingPlan, UNKNOWN_TABLE_NAME};
pub use reassign::{ReassignStatus, Reassignment, reassign};
pub use session::{Error, Session};
pub use store::{FileStore, InMemoryStore, PlanStore, StoreError, check_plan_id, new_plan_id};
