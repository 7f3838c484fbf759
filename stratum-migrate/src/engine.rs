//! Two-phase schema upgrade execution.
//!
//! The upgrader applies a [`MigrationPlan`] in two phases: one batch with
//! every drop statement, then one batch with every create statement. Each
//! phase is individually atomic through the executor; the pair is not. A
//! create-phase failure after a committed drop phase leaves the schema with
//! objects dropped but not recreated, surfaced as
//! [`MigrationError::CreatePhaseFailed`]; recovery policy belongs to the
//! caller.

use std::collections::HashMap;
use std::time::Instant;

use indexmap::IndexMap;
use stratum_schema::RelationalModel;
use tracing::{debug, info};

use crate::error::{MigrateResult, MigrationError};
use crate::fingerprint::{FingerprintGenerator, SchemaObjectKey};
use crate::history::{FingerprintRecord, FingerprintStore};
use crate::plan::{MigrationPlan, MigrationPlanner};
use crate::sql::PostgresDdlBuilder;
use crate::statement::{DdlStatement, StatementBatch};

/// DDL execution primitive.
///
/// One call executes one DDL block atomically: implementations reuse an
/// already-open transaction when one is present, otherwise they wrap the
/// block in a transaction of their own, committed on success and rolled
/// back on failure.
#[async_trait::async_trait]
pub trait DdlExecutor: Send + Sync {
    /// Execute a DDL batch.
    async fn execute_batch(&self, sql: &str) -> MigrateResult<()>;
}

#[async_trait::async_trait]
impl<E: DdlExecutor + ?Sized> DdlExecutor for std::sync::Arc<E> {
    async fn execute_batch(&self, sql: &str) -> MigrateResult<()> {
        (**self).execute_batch(sql).await
    }
}

/// Configuration for the migration engine.
#[derive(Debug, Clone)]
pub struct UpgradeConfig {
    /// Logical schema owner recorded with every fingerprint. Distinct owners
    /// can share one physical fingerprint table without colliding.
    pub owner: String,
    /// Plan and build DDL without executing or recording anything.
    pub dry_run: bool,
}

impl UpgradeConfig {
    /// Create a configuration for the given owner.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            dry_run: false,
        }
    }

    /// Enable dry-run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Result of an upgrade operation.
#[derive(Debug)]
pub struct UpgradeReport {
    /// Statements executed in the drop phase.
    pub dropped_statements: usize,
    /// Statements executed in the create phase.
    pub created_statements: usize,
    /// Total duration in milliseconds.
    pub duration_ms: i64,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl UpgradeReport {
    /// Check if any DDL was executed (or would have been, for a dry run).
    pub fn has_changes(&self) -> bool {
        self.dropped_statements > 0 || self.created_statements > 0
    }

    /// Get a summary of the result.
    pub fn summary(&self) -> String {
        let prefix = if self.dry_run { "[DRY RUN] " } else { "" };
        if !self.has_changes() {
            format!("{}No DDL executed", prefix)
        } else {
            format!(
                "{}{} drop statements, {} create statements in {}ms",
                prefix, self.dropped_statements, self.created_statements, self.duration_ms
            )
        }
    }
}

/// Applies a migration plan against a live database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaUpgrader {
    builder: PostgresDdlBuilder,
}

impl SchemaUpgrader {
    /// Create a new upgrader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the drop-phase batch: all drop-table statements first, then all
    /// drop-index statements. Dropping tables first avoids racing the
    /// implicit index drops a table drop performs.
    pub fn drop_batch(&self, plan: &MigrationPlan) -> StatementBatch {
        let mut batch = StatementBatch::new();
        for name in &plan.tables_to_drop {
            batch.push(DdlStatement::DropTable(self.builder.drop_table(name)));
        }
        for name in &plan.indexes_to_drop {
            batch.push(DdlStatement::DropIndex(self.builder.drop_index(name)));
        }
        batch
    }

    /// Build the create-phase batch: every table in `tables_to_create` with
    /// its indexes, then standalone create-index statements for indexes
    /// whose owning table is not being recreated. A recreated table already
    /// regenerates its indexes as part of its full DDL.
    pub fn create_batch(&self, model: &RelationalModel, plan: &MigrationPlan) -> StatementBatch {
        let mut batch = self.builder.database_subset(model, &plan.tables_to_create);

        for name in &plan.indexes_to_create {
            let Some(index) = model.index(name) else {
                debug!(index = %name, "Planned index not present in model; skipping");
                continue;
            };
            if plan.tables_to_create.contains(index.table.as_str()) {
                continue;
            }
            batch.push(DdlStatement::CreateIndex(self.builder.create_index(index)));
        }

        batch
    }

    /// Apply the plan in two transactional phases. An empty phase is a
    /// no-op and is never executed as an empty SQL statement.
    pub async fn apply<E: DdlExecutor>(
        &self,
        executor: &E,
        model: &RelationalModel,
        plan: &MigrationPlan,
    ) -> MigrateResult<UpgradeReport> {
        let start = Instant::now();

        let drops = self.drop_batch(plan);
        if !drops.is_empty() {
            debug!(statements = drops.len(), "Executing drop phase");
            executor
                .execute_batch(&drops.render())
                .await
                .map_err(|e| MigrationError::DropPhaseFailed(e.to_string()))?;
        }

        let creates = self.create_batch(model, plan);
        if !creates.is_empty() {
            debug!(statements = creates.len(), "Executing create phase");
            executor.execute_batch(&creates.render()).await.map_err(|e| {
                if drops.is_empty() {
                    // Nothing was dropped; the failure is not a partial state.
                    e
                } else {
                    MigrationError::CreatePhaseFailed(e.to_string())
                }
            })?;
        }

        Ok(UpgradeReport {
            dropped_statements: drops.len(),
            created_statements: creates.len(),
            duration_ms: start.elapsed().as_millis() as i64,
            dry_run: false,
        })
    }
}

/// The migration engine: fingerprints a model, plans against recorded
/// history, applies the plan, and reconciles the fingerprint store.
pub struct MigrationEngine<S: FingerprintStore, E: DdlExecutor> {
    config: UpgradeConfig,
    store: S,
    executor: E,
    generator: FingerprintGenerator,
    upgrader: SchemaUpgrader,
}

impl<S: FingerprintStore, E: DdlExecutor> MigrationEngine<S, E> {
    /// Create a new migration engine.
    pub fn new(config: UpgradeConfig, store: S, executor: E) -> Self {
        Self {
            config,
            store,
            executor,
            generator: FingerprintGenerator::new(),
            upgrader: SchemaUpgrader::new(),
        }
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &UpgradeConfig {
        &self.config
    }

    /// Initialize the fingerprint store.
    pub async fn initialize(&self) -> MigrateResult<()> {
        self.store.initialize().await
    }

    /// Stored fingerprint records for the configured owner. A store whose
    /// backing table does not exist yet reads as empty history, so first
    /// runs and drifted pre-existing databases take the same "everything is
    /// new" path.
    async fn stored_records(&self) -> MigrateResult<Vec<FingerprintRecord>> {
        if !self.store.exists().await? {
            debug!("Fingerprint store missing; treating as empty history");
            return Ok(Vec::new());
        }
        self.store.list(&self.config.owner).await
    }

    /// Compute the migration plan for a model without executing anything.
    pub async fn plan(&self, model: &RelationalModel) -> MigrateResult<MigrationPlan> {
        let current = self.generator.generate(model);
        let records = self.stored_records().await?;
        Ok(MigrationPlanner::new(records, current).plan())
    }

    /// Plan and apply the upgrade, then record the new fingerprints.
    ///
    /// Fingerprints are written only after the create phase committed; a
    /// failed upgrade leaves the recorded history untouched so the next run
    /// replans the same work.
    pub async fn upgrade(&self, model: &RelationalModel) -> MigrateResult<UpgradeReport> {
        let current = self.generator.generate(model);
        let records = self.stored_records().await?;
        let stored: HashMap<SchemaObjectKey, String> = records
            .iter()
            .map(|r| (r.key.clone(), r.hash.clone()))
            .collect();
        let plan = MigrationPlanner::new(records, current.clone()).plan();

        info!(owner = %self.config.owner, summary = %plan.summary(), "Planned schema upgrade");

        if self.config.dry_run {
            return Ok(UpgradeReport {
                dropped_statements: self.upgrader.drop_batch(&plan).len(),
                created_statements: self.upgrader.create_batch(model, &plan).len(),
                duration_ms: 0,
                dry_run: true,
            });
        }

        let report = self.upgrader.apply(&self.executor, model, &plan).await?;

        self.reconcile_store(&stored, &current).await?;

        Ok(report)
    }

    /// Bring the store in line with the current fingerprints: upsert new and
    /// changed keys, delete keys that left the model.
    async fn reconcile_store(
        &self,
        stored: &HashMap<SchemaObjectKey, String>,
        current: &IndexMap<SchemaObjectKey, String>,
    ) -> MigrateResult<()> {
        if !self.store.exists().await? {
            self.store.initialize().await?;
        }

        for (key, hash) in current {
            match stored.get(key) {
                Some(old) if old == hash => {}
                _ => self.store.upsert(&self.config.owner, key, hash).await?,
            }
        }

        for key in stored.keys() {
            if !current.contains_key(key) {
                self.store.delete(&self.config.owner, key).await?;
            }
        }

        Ok(())
    }
}
