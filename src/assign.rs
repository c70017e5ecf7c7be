//! Sequential seat filling.

use crate::model::{Guest, Table};

/// The seating derived by [`assign`].
#[derive(Debug, Clone)]
pub struct Assignment {
    pub tables: Vec<Table>,

    /// Every input guest, in input order, with updated seating
    pub guests: Vec<Guest>,

    /// Guests left without a table, in encounter order
    pub unassigned: Vec<Guest>,
}

/// Seat `guests` at `tables` from scratch, filling tables left to right.
///
/// All prior seating is discarded. A cursor starts at the first table; when
/// the cursor table is full it advances by exactly one table. If that table
/// is also full, or there is none, the guest is left unassigned.
pub fn assign(guests: &[Guest], tables: &[Table]) -> Assignment {
    let mut tables: Vec<Table> = tables
        .iter()
        .map(|t| Table {
            guests: Vec::new(),
            ..t.clone()
        })
        .collect();
    let mut guests = guests.to_vec();
    let mut unassigned = Vec::new();

    let mut cursor = 0;
    for guest in &mut guests {
        if tables.get(cursor).is_some_and(Table::is_full) {
            cursor += 1;
        }

        let seated = tables
            .get_mut(cursor)
            .and_then(|table| table.push(guest.id.clone()).map(|seat| (table.id.clone(), seat)));

        match seated {
            Some((table, seat)) => guest.sit_at(table, seat),
            None => {
                guest.unseat();
                unassigned.push(guest.clone());
            }
        }
    }

    tracing::debug!(
        seated = guests.len() - unassigned.len(),
        unassigned = unassigned.len(),
        "auto-assigned guests"
    );

    Assignment {
        tables,
        guests,
        unassigned,
    }
}
