//! # stratum-migrate
//!
//! Fingerprint-based schema migration engine.
//!
//! This crate provides functionality for:
//! - DDL generation for a relational model (PostgreSQL statement grammar)
//! - Per-object content fingerprints over the generated DDL text
//! - Migration planning by comparing recorded fingerprints against fresh ones
//! - Two-phase (drop, then create) transactional upgrade execution
//! - Fingerprint history tracking through a pluggable store
//!
//! ## Architecture
//!
//! The engine renders the DDL each table and index of the model implies,
//! hashes every object's text, and compares the hashes against the store's
//! records to decide exactly which objects to drop and which to (re)create.
//! Any detected change is handled as drop + recreate; there is no in-place
//! column alteration.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │ Relational Model │────▶│ Fingerprint Gen  │────▶│ Migration Plan  │
//! └──────────────────┘     └──────────────────┘     └─────────────────┘
//!                                   ▲                        │
//!                          ┌────────┴────────┐               ▼
//!                          │ Fingerprint     │      ┌─────────────────┐
//!                          │ Store (history) │◀─────│ Upgrader        │
//!                          └─────────────────┘      │ drop ▸ create   │
//!                                                   └─────────────────┘
//! ```
//!
//! The two upgrade phases are each atomic, but the pair is not: a create
//! phase failing after a committed drop phase is surfaced as
//! [`MigrationError::CreatePhaseFailed`] and recovery belongs to the caller.
//! Fingerprints are recorded only after the create phase commits, so a
//! failed run replans the same work.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stratum_migrate::{MigrationEngine, UpgradeConfig};
//!
//! async fn run_upgrade() -> Result<(), Box<dyn std::error::Error>> {
//!     // Obtain the model from your metadata layer
//!     let model = /* ModelSource::load() */;
//!
//!     // Wire up your store and executor implementations
//!     let store = /* your FingerprintStore */;
//!     let executor = /* your DdlExecutor */;
//!
//!     let engine = MigrationEngine::new(UpgradeConfig::new("main"), store, executor);
//!     engine.initialize().await?;
//!
//!     let plan = engine.plan(&model).await?;
//!     println!("Plan: {}", plan.summary());
//!
//!     let report = engine.upgrade(&model).await?;
//!     println!("{}", report.summary());
//!
//!     Ok(())
//! }
//! ```
//!
//! Schema migration against one physical database must not run concurrently
//! with itself; the engine executes strictly sequentially and expects the
//! caller to enforce single-flight (an advisory lock, or one process per
//! database). No state is cached between invocations: every call recomputes
//! fingerprints from the current model.

pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod history;
pub mod plan;
pub mod sql;
pub mod statement;

// Re-exports
pub use engine::{DdlExecutor, MigrationEngine, SchemaUpgrader, UpgradeConfig, UpgradeReport};
pub use error::{MigrateResult, MigrationError};
pub use fingerprint::{FingerprintGenerator, SchemaObjectKey, SchemaObjectKind};
pub use history::{FingerprintRecord, FingerprintStore, POSTGRES_INIT_SQL};
pub use plan::{MigrationPlan, MigrationPlanner};
pub use sql::{PostgresDdlBuilder, quote_ident};
pub use statement::{
    CreateIndexStatement, CreateTableStatement, DdlStatement, DropIndexStatement,
    DropTableStatement, STATEMENT_SEPARATOR, StatementBatch,
};
