//! Guest and table records.
//!
//! A guest knows which table it sits at (`table_id` + `seat_number`), and a
//! table knows which guests sit at it (`guests`, in seat order). Every engine
//! operation keeps both directions in agreement.

use std::cmp::Ordering;
use std::fmt;

use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};

/// Identifier of a guest. Minted once and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(String);

impl GuestId {
    /// Mint a fresh, process-unique guest id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GuestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GuestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    /// The id regeneration gives the table at 1-based `position`.
    pub fn numbered(position: usize) -> Self {
        Self(format!("table-{position}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A person to be seated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: GuestId,

    /// The input token, trimmed
    pub original_name: String,

    /// Case-folded display name, used for duplicate detection and lookup
    pub normalized_name: String,

    /// Name shown to people; suffixed with `(N)` on repeated names
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    table_id: Option<TableId>,

    /// 1-based position at the table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seat_number: Option<u32>,
}

impl Guest {
    /// Create an unseated guest with a fresh id.
    pub fn new(original_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            id: GuestId::generate(),
            original_name: original_name.into(),
            normalized_name: fold_case(&display_name),
            display_name,
            table_id: None,
            seat_number: None,
        }
    }

    pub fn table_id(&self) -> Option<&TableId> {
        self.table_id.as_ref()
    }

    pub fn seat_number(&self) -> Option<u32> {
        self.seat_number
    }

    /// The `(table, seat)` pair, if seated.
    pub fn seat(&self) -> Option<(&TableId, u32)> {
        match (&self.table_id, self.seat_number) {
            (Some(table), Some(seat)) => Some((table, seat)),
            _ => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.table_id.is_some()
    }

    /// Seat this guest. Table and seat are always written together.
    pub(crate) fn sit_at(&mut self, table: TableId, seat: u32) {
        self.table_id = Some(table);
        self.seat_number = Some(seat);
    }

    pub(crate) fn unseat(&mut self) {
        self.table_id = None;
        self.seat_number = None;
    }
}

/// A capacity-bounded seating unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub capacity: u32,

    /// Seated guest ids; position + 1 is the seat number
    #[serde(default)]
    pub guests: Vec<GuestId>,
}

impl Table {
    pub fn new(id: TableId, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            guests: Vec::new(),
        }
    }

    pub fn occupancy(&self) -> usize {
        self.guests.len()
    }

    /// Seats still free. Never negative, even on a table loaded over capacity.
    pub fn remaining(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.guests.len())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Append a guest and return its seat number, or `None` if full.
    pub(crate) fn push(&mut self, guest: GuestId) -> Option<u32> {
        if self.is_full() {
            return None;
        }
        self.guests.push(guest);
        u32::try_from(self.guests.len()).ok()
    }
}

/// Case folding used for normalized names and name matching.
pub fn fold_case(name: &str) -> String {
    name.to_lowercase()
}

/// Locale-aware, case-insensitive ordering of guest names.
///
/// Compares at secondary strength with the root collation: accents order
/// next to their base letter and case differences compare equal, so a
/// stable sort keeps case-only ties in input order.
pub struct NameOrder {
    collator: Option<Collator>,
}

impl NameOrder {
    pub fn new() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        let collator = match Collator::try_new(&Default::default(), options) {
            Ok(collator) => Some(collator),
            Err(error) => {
                tracing::warn!(%error, "collation data unavailable, sorting names by code point");
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => fold_case(a).cmp(&fold_case(b)),
        }
    }
}

impl Default for NameOrder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build `count` fresh tables named `Table 1`..`Table N`.
pub fn numbered_tables(count: usize, capacity: u32) -> Vec<Table> {
    (1..=count)
        .map(|n| Table::new(TableId::numbered(n), format!("Table {n}"), capacity))
        .collect()
}
