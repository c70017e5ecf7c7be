//! Editing a stored plan, one operation at a time.
//!
//! A session holds the current snapshot. Each operation hands the snapshot
//! to an engine function, replaces it with the result and saves it before
//! returning, so the store always has the latest state.

use thiserror::Error;

use crate::assign::assign;
use crate::config::{Config, ConfigError};
use crate::model::{Guest, GuestId, TableId, numbered_tables};
use crate::names::{NameError, NameGenerator};
use crate::normalize::{MergeOutcome, merge, normalize};
use crate::plan::SeatingPlan;
use crate::reassign::{ReassignStatus, Reassignment, reassign};
use crate::store::{PlanStore, StoreError, check_plan_id};

pub struct Session<S> {
    store: S,
    plan_id: String,
    plan: SeatingPlan,
    config: Config,
    is_new: bool,
}

impl<S: PlanStore> Session<S> {
    /// Load `plan_id` from `store`, or start a fresh plan with the default
    /// table layout if it does not exist yet.
    pub fn open(store: S, plan_id: &str, config: Config) -> Result<Self, Error> {
        check_plan_id(plan_id)?;

        let (plan, is_new) = match store.load(plan_id)? {
            Some(plan) => {
                if let Err(problems) = plan.validate() {
                    for problem in &problems {
                        tracing::warn!(plan_id, "{problem}");
                    }
                }
                (plan, false)
            }
            None => {
                tracing::info!(plan_id, "starting new plan");
                let tables = numbered_tables(config.table_count, config.table_capacity);
                (SeatingPlan::new(tables, Vec::new()), true)
            }
        };

        Ok(Self {
            store,
            plan_id: plan_id.to_string(),
            plan,
            config,
            is_new,
        })
    }

    pub fn plan(&self) -> &SeatingPlan {
        &self.plan
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the plan has never been saved.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn share_url(&self) -> String {
        self.config.share_url(&self.plan_id)
    }

    /// Replace the tables with `count` fresh ones. Unseats everybody.
    pub fn regenerate_tables(&mut self, count: usize, capacity: u32) -> Result<(), Error> {
        self.config.check_layout(count, capacity)?;

        let mut plan = self.plan.clone();
        plan.regenerate_tables(count, capacity);
        self.commit(plan)?;

        tracing::info!(count, capacity, "regenerated tables");
        Ok(())
    }

    /// Replace the whole guest list with `raw`, normalized. Table seat lists
    /// are cleared since the old guests are gone. Returns the new guest count.
    pub fn import_guests(&mut self, raw: &str) -> Result<usize, Error> {
        let guests = normalize(raw);
        let count = guests.len();

        let mut plan = self.plan.clone();
        for table in &mut plan.tables {
            table.guests.clear();
        }
        plan.guests = guests;
        self.commit(plan)?;

        tracing::info!(count, "imported guest list");
        Ok(count)
    }

    /// Add the names in `raw`, skipping any whose normalized name is
    /// already on the list.
    pub fn add_guests(&mut self, raw: &str) -> Result<MergeOutcome, Error> {
        let outcome = merge(&self.plan.guests, raw);

        if !outcome.skipped.is_empty() {
            tracing::warn!(skipped = ?outcome.skipped, "skipped guests already on the list");
        }

        if outcome.changed() {
            let plan = SeatingPlan {
                guests: outcome.guests.clone(),
                ..self.plan.clone()
            };
            self.commit(plan)?;
            tracing::info!(added = outcome.added.len(), "added guests");
        }

        Ok(outcome)
    }

    /// Seat everyone from scratch in list order. Returns the guests that
    /// did not fit.
    pub fn auto_assign(&mut self) -> Result<Vec<Guest>, Error> {
        let out = assign(&self.plan.guests, &self.plan.tables);
        let plan = SeatingPlan {
            tables: out.tables,
            guests: out.guests,
            ..self.plan.clone()
        };
        self.commit(plan)?;

        if out.unassigned.is_empty() {
            tracing::info!("every guest has a seat");
        } else {
            tracing::warn!(
                unassigned = out.unassigned.len(),
                "not enough seats for every guest"
            );
        }
        Ok(out.unassigned)
    }

    /// Move guests to `table`. Each key is a guest id or a display name.
    ///
    /// The result is saved whatever the status: guests are detached from
    /// their old tables even when the target is missing or fills up.
    pub fn assign_to_table<K: AsRef<str>>(
        &mut self,
        keys: &[K],
        table: &TableId,
    ) -> Result<Reassignment, Error> {
        let ids: Vec<GuestId> = keys
            .iter()
            .map(|key| {
                let key = key.as_ref();
                self.plan
                    .resolve_guest(key)
                    .map(|g| g.id.clone())
                    .unwrap_or_else(|| GuestId::from(key))
            })
            .collect();

        let out = reassign(&ids, table, &self.plan.guests, &self.plan.tables);
        let plan = SeatingPlan {
            tables: out.tables.clone(),
            guests: out.guests.clone(),
            ..self.plan.clone()
        };
        self.commit(plan)?;

        if !out.unknown_guests.is_empty() {
            tracing::warn!(unknown = ?out.unknown_guests, "ignored unknown guests");
        }
        match &out.status {
            ReassignStatus::Complete => {
                tracing::info!(%table, count = ids.len(), "moved guests");
            }
            ReassignStatus::TableNotFound { table_id } => {
                tracing::warn!(%table_id, "no such table; guests were left unassigned");
            }
            ReassignStatus::CapacityReached {
                seated,
                left_unassigned,
            } => {
                tracing::warn!(
                    %table,
                    seated,
                    left = left_unassigned.len(),
                    "table is full; remaining guests were left unassigned"
                );
            }
        }

        Ok(out)
    }

    pub fn rename_table(&mut self, table: &TableId, name: &str) -> Result<(), Error> {
        let mut plan = self.plan.clone();
        if !plan.rename_table(table, name) {
            return Err(Error::UnknownTable {
                table_id: table.clone(),
            });
        }
        self.commit(plan)?;
        tracing::info!(%table, name, "renamed table");
        Ok(())
    }

    /// Name the tables after `theme` using `generator`. On failure nothing
    /// changes. Returns how many tables were renamed.
    pub async fn name_tables(
        &mut self,
        generator: &dyn NameGenerator,
        theme: &str,
    ) -> Result<usize, Error> {
        let count = self.plan.tables.len();
        let names = generator.generate(theme, count).await?;
        if names.len() < count {
            tracing::warn!(
                wanted = count,
                got = names.len(),
                "fewer names than tables; the rest keep their names"
            );
        }

        let mut plan = self.plan.clone();
        let changed = plan.apply_table_names(&names);
        self.commit(plan)?;

        tracing::info!(theme, changed, "named tables");
        Ok(changed)
    }

    /// Save `plan` under this session's id and make it current.
    fn commit(&mut self, plan: SeatingPlan) -> Result<(), Error> {
        self.store.save(&self.plan_id, &plan)?;
        self.plan = SeatingPlan {
            id: Some(self.plan_id.clone()),
            ..plan
        };
        self.is_new = false;
        Ok(())
    }
}

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no table with id '{table_id}'")]
    UnknownTable { table_id: TableId },

    #[error("failed to generate table names")]
    Names(#[from] NameError),
}
