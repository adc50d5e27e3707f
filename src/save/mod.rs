//! Save transactions and the linked-save workflow.
//!
//! - [`SaveTransaction`]: single-use batch of attach, add and set-link
//!   operations committed atomically
//! - [`LinkedSaveWorkflow`]: creates an entity linked to existing ones and
//!   invalidates the derived collections the new links affect

mod transaction;
mod workflow;

pub use transaction::{SaveTransaction, TransactionState};
pub use workflow::{LinkReference, LinkedSaveWorkflow};
