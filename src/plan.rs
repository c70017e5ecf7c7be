//! The seating plan snapshot.
//!
//! A plan is the full `(tables, guests)` pair plus the id it is stored
//! under. It is what gets written to disk after every edit, as TOML:
//!
//! ```toml
//! id = "3f2c..."
//!
//! [[table]]
//! id = "table-1"
//! name = "Table 1"
//! capacity = 10
//! guests = ["5b1e..."]
//!
//! [[guest]]
//! id = "5b1e..."
//! original_name = "Jane Doe"
//! normalized_name = "jane doe"
//! display_name = "Jane Doe"
//! table_id = "table-1"
//! seat_number = 1
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Guest, GuestId, Table, TableId, fold_case, numbered_tables};

/// Shown for a guest whose table id does not resolve.
pub const UNKNOWN_TABLE_NAME: &str = "Unknown Table";

/// The complete seating plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingPlan {
    /// Storage key, assigned on first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "table", default)]
    pub tables: Vec<Table>,

    #[serde(rename = "guest", default)]
    pub guests: Vec<Guest>,
}

/// A guest found by [`SeatingPlan::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupMatch<'a> {
    pub guest: &'a Guest,
    pub table_name: &'a str,
    pub seat_number: u32,
}

/// A broken link between tables and guests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Inconsistency {
    #[error("table '{table}' seats {occupants} guests but holds only {capacity}")]
    OverCapacity {
        table: TableId,
        occupants: usize,
        capacity: u32,
    },

    #[error("table '{table}' has zero capacity")]
    ZeroCapacity { table: TableId },

    #[error("table '{table}' lists unknown guest '{guest}'")]
    UnknownGuest { table: TableId, guest: GuestId },

    #[error("guest '{guest}' is listed at table '{table}' but does not point back to it")]
    NotBackLinked { table: TableId, guest: GuestId },

    #[error("guest '{guest}' appears {count} times across tables")]
    SeatedTwice { guest: GuestId, count: usize },

    #[error("guest '{guest}' points at table '{table}' which does not list them")]
    Orphaned { guest: GuestId, table: TableId },
}

impl SeatingPlan {
    pub fn new(tables: Vec<Table>, guests: Vec<Guest>) -> Self {
        Self {
            id: None,
            tables,
            guests,
        }
    }

    /// Parse a plan from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize the plan to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Serialize the plan to pretty JSON, for export.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn table(&self, id: &TableId) -> Option<&Table> {
        self.tables.iter().find(|t| &t.id == id)
    }

    pub fn guest(&self, id: &GuestId) -> Option<&Guest> {
        self.guests.iter().find(|g| &g.id == id)
    }

    /// Find a guest by id, or else by display name (case-insensitive).
    pub fn resolve_guest(&self, key: &str) -> Option<&Guest> {
        let folded = fold_case(key);
        self.guests
            .iter()
            .find(|g| g.id.as_str() == key)
            .or_else(|| self.guests.iter().find(|g| g.normalized_name == folded))
    }

    pub fn unassigned(&self) -> impl Iterator<Item = &Guest> {
        self.guests.iter().filter(|g| !g.is_assigned())
    }

    pub fn unassigned_count(&self) -> usize {
        self.unassigned().count()
    }

    pub fn total_capacity(&self) -> usize {
        self.tables.iter().map(|t| t.capacity as usize).sum()
    }

    /// Replace all tables with `count` fresh ones and unseat every guest.
    pub fn regenerate_tables(&mut self, count: usize, capacity: u32) {
        self.tables = numbered_tables(count, capacity);
        for guest in &mut self.guests {
            guest.unseat();
        }
    }

    /// Rename a table. Returns `false` if there is no such table.
    pub fn rename_table(&mut self, id: &TableId, name: impl Into<String>) -> bool {
        match self.tables.iter_mut().find(|t| &t.id == id) {
            Some(table) => {
                table.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Apply names to tables in order. Extra names are ignored; tables past
    /// the end of `names` keep their current name. Returns how many changed.
    pub fn apply_table_names(&mut self, names: &[String]) -> usize {
        let mut changed = 0;
        for (table, name) in self.tables.iter_mut().zip(names) {
            table.name.clone_from(name);
            changed += 1;
        }
        changed
    }

    /// Seated guests whose normalized name contains `query`, folded and
    /// trimmed. A blank query matches nothing.
    pub fn lookup(&self, query: &str) -> Vec<LookupMatch<'_>> {
        let query = fold_case(query.trim());
        if query.is_empty() {
            return Vec::new();
        }

        self.guests
            .iter()
            .filter(|g| g.normalized_name.contains(&query))
            .filter_map(|guest| {
                let (table_id, seat_number) = guest.seat()?;
                let table_name = self
                    .table(table_id)
                    .map(|t| t.name.as_str())
                    .unwrap_or(UNKNOWN_TABLE_NAME);
                Some(LookupMatch {
                    guest,
                    table_name,
                    seat_number,
                })
            })
            .collect()
    }

    /// Check capacity and the table/guest links in both directions.
    ///
    /// Seat numbers are not checked against list positions: moving a guest
    /// away leaves the remaining seat numbers as they were.
    pub fn validate(&self) -> Result<(), Vec<Inconsistency>> {
        let mut problems = Vec::new();
        let by_id: HashMap<&GuestId, &Guest> = self.guests.iter().map(|g| (&g.id, g)).collect();
        let mut listed: HashMap<&GuestId, Vec<&TableId>> = HashMap::new();

        for table in &self.tables {
            if table.capacity == 0 {
                problems.push(Inconsistency::ZeroCapacity {
                    table: table.id.clone(),
                });
            }
            if table.guests.len() > table.capacity as usize {
                problems.push(Inconsistency::OverCapacity {
                    table: table.id.clone(),
                    occupants: table.guests.len(),
                    capacity: table.capacity,
                });
            }
            for guest_id in &table.guests {
                listed.entry(guest_id).or_default().push(&table.id);
                match by_id.get(guest_id) {
                    None => problems.push(Inconsistency::UnknownGuest {
                        table: table.id.clone(),
                        guest: guest_id.clone(),
                    }),
                    Some(guest) if guest.table_id() != Some(&table.id) => {
                        problems.push(Inconsistency::NotBackLinked {
                            table: table.id.clone(),
                            guest: guest_id.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for guest in &self.guests {
            let tables = listed.get(&guest.id).map(Vec::as_slice).unwrap_or_default();
            if tables.len() > 1 {
                problems.push(Inconsistency::SeatedTwice {
                    guest: guest.id.clone(),
                    count: tables.len(),
                });
            }
            if let Some(table) = guest.table_id() {
                if !tables.contains(&table) {
                    problems.push(Inconsistency::Orphaned {
                        guest: guest.id.clone(),
                        table: table.clone(),
                    });
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::assign;
    use crate::normalize::normalize;

    fn seated_plan() -> SeatingPlan {
        // Ann Lee, Jane Doe, jane doe (2), John Smith; the repeat stays unseated.
        let (later, now): (Vec<_>, Vec<_>) = normalize("Jane Doe, John Smith, Ann Lee, jane doe")
            .into_iter()
            .partition(|g| g.display_name == "jane doe (2)");
        let out = assign(&now, &numbered_tables(2, 2));
        let mut all = out.guests;
        all.extend(later);
        SeatingPlan::new(out.tables, all)
    }

    #[test]
    fn toml_round_trip_keeps_seating() {
        let plan = seated_plan();
        let text = plan.to_toml().unwrap();
        assert!(text.contains("[[table]]"));
        assert!(text.contains("[[guest]]"));
        assert_eq!(SeatingPlan::from_toml(&text).unwrap(), plan);
    }

    #[test]
    fn empty_document_is_empty_plan() {
        let plan = SeatingPlan::from_toml("").unwrap();
        assert_eq!(plan, SeatingPlan::default());
    }

    #[test]
    fn lookup_finds_only_seated_substring_matches() {
        let plan = seated_plan();
        let found: Vec<_> = plan
            .lookup("  JANE ")
            .iter()
            .map(|m| (m.guest.display_name.clone(), m.table_name.to_string(), m.seat_number))
            .collect();
        // "jane doe (2)" was never seated.
        assert_eq!(found, [("Jane Doe".to_string(), "Table 1".to_string(), 2)]);
        assert!(plan.lookup("   ").is_empty());
    }

    #[test]
    fn lookup_falls_back_to_unknown_table_name() {
        let mut plan = seated_plan();
        plan.tables.clear();
        let found = plan.lookup("smith");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].table_name, UNKNOWN_TABLE_NAME);
    }

    #[test]
    fn regenerate_unseats_everyone() {
        let mut plan = seated_plan();
        plan.regenerate_tables(3, 5);
        assert_eq!(plan.tables.len(), 3);
        assert_eq!(plan.unassigned_count(), plan.guests.len());
        assert_eq!(plan.total_capacity(), 15);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn apply_table_names_zips_in_order() {
        let mut plan = seated_plan();
        let changed = plan.apply_table_names(&["Rose".to_string()]);
        assert_eq!(changed, 1);
        assert_eq!(plan.tables[0].name, "Rose");
        assert_eq!(plan.tables[1].name, "Table 2");
    }

    #[test]
    fn rename_reports_unknown_table() {
        let mut plan = seated_plan();
        assert!(plan.rename_table(&TableId::numbered(2), "Head Table"));
        assert!(!plan.rename_table(&TableId::from("nope"), "x"));
        assert_eq!(plan.tables[1].name, "Head Table");
    }

    #[test]
    fn resolve_guest_by_id_or_name() {
        let plan = seated_plan();
        let jane = plan
            .guests
            .iter()
            .find(|g| g.display_name == "Jane Doe")
            .unwrap();
        assert_eq!(plan.resolve_guest(jane.id.as_str()), Some(jane));
        assert_eq!(plan.resolve_guest("JANE DOE"), Some(jane));
        assert_eq!(plan.resolve_guest("Nobody"), None);
    }

    #[test]
    fn validate_flags_broken_links() {
        let mut plan = seated_plan();
        assert!(plan.validate().is_ok());

        let stray = plan.tables[0].guests.remove(0);
        plan.tables[1].capacity = 0;
        let problems = plan.validate().unwrap_err();

        assert!(problems.contains(&Inconsistency::Orphaned {
            guest: stray,
            table: TableId::numbered(1),
        }));
        assert!(problems.iter().any(|p| matches!(p, Inconsistency::OverCapacity { .. })));
        assert!(problems.iter().any(|p| matches!(p, Inconsistency::ZeroCapacity { .. })));
    }
}
