//! Moving a chosen set of guests to one table.

use std::collections::HashSet;

use crate::model::{Guest, GuestId, Table, TableId};

/// How a [`reassign`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassignStatus {
    /// Every requested guest is seated at the target table.
    Complete,

    /// The target table does not exist. The guests were detached from their
    /// old tables and are now unassigned.
    TableNotFound { table_id: TableId },

    /// The target filled up part-way. `left_unassigned` were detached and
    /// never re-seated; they are not returned to their old tables.
    CapacityReached {
        seated: usize,
        left_unassigned: Vec<GuestId>,
    },
}

/// New snapshot produced by [`reassign`].
#[derive(Debug, Clone)]
pub struct Reassignment {
    pub tables: Vec<Table>,
    pub guests: Vec<Guest>,
    pub status: ReassignStatus,

    /// Requested ids that matched no guest; they were ignored
    pub unknown_guests: Vec<GuestId>,
}

impl Reassignment {
    pub fn is_complete(&self) -> bool {
        self.status == ReassignStatus::Complete
    }
}

/// Detach `guest_ids` from wherever they sit, then seat them at `target`
/// in the given order until it is full.
///
/// Occupants left behind keep their seat numbers, so a vacated table can
/// have gaps. Overflow stops processing at the first guest that does not
/// fit, without rolling anyone back.
pub fn reassign(
    guest_ids: &[GuestId],
    target: &TableId,
    guests: &[Guest],
    tables: &[Table],
) -> Reassignment {
    let mut tables = tables.to_vec();
    let mut guests = guests.to_vec();

    // Requested ids as a set, first occurrence wins.
    let mut seen = HashSet::new();
    let mut requested = Vec::new();
    let mut unknown_guests = Vec::new();
    for id in guest_ids {
        if !seen.insert(id) {
            continue;
        }
        match guests.iter().position(|g| &g.id == id) {
            Some(index) => requested.push(index),
            None => unknown_guests.push(id.clone()),
        }
    }

    for &index in &requested {
        let guest = &mut guests[index];
        if let Some(old) = guest.table_id() {
            if let Some(table) = tables.iter_mut().find(|t| &t.id == old) {
                table.guests.retain(|g| g != &guest.id);
            }
        }
        guest.unseat();
    }

    let Some(table) = tables.iter_mut().find(|t| &t.id == target) else {
        tracing::debug!(%target, "reassign target table not found");
        return Reassignment {
            tables,
            guests,
            status: ReassignStatus::TableNotFound {
                table_id: target.clone(),
            },
            unknown_guests,
        };
    };

    let mut status = ReassignStatus::Complete;
    for (n, &index) in requested.iter().enumerate() {
        let guest = &mut guests[index];
        match table.push(guest.id.clone()) {
            Some(seat) => guest.sit_at(table.id.clone(), seat),
            None => {
                status = ReassignStatus::CapacityReached {
                    seated: n,
                    left_unassigned: requested[n..]
                        .iter()
                        .map(|&i| guests[i].id.clone())
                        .collect(),
                };
                break;
            }
        }
    }

    tracing::debug!(%target, ?status, "reassigned guests");

    Reassignment {
        tables,
        guests,
        status,
        unknown_guests,
    }
}
