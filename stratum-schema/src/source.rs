//! The model source interface.

use crate::error::ModelError;
use crate::model::RelationalModel;

/// Produces the relational model for the current schema declaration.
///
/// Implemented by the external metadata layer (an ORM, an introspector, a
/// schema file parser) over an already-opened connection or context. The
/// migration engine requires the produced model to be deterministic for a
/// fixed schema declaration: same declaration, same model, same iteration
/// order.
#[async_trait::async_trait]
pub trait ModelSource: Send + Sync {
    /// Produce the relational model.
    async fn load(&self) -> Result<RelationalModel, ModelError>;
}
