//! Engine for reviewing blind A/B video comparisons.
//!
//! [`api`] loads a task's pairs and evaluation state, [`engine`] steps
//! through them while keeping two players in sync, and [`choice`] turns a
//! stored evaluation into the label the reviewer sees.

pub mod api;
pub mod choice;
pub mod engine;
pub mod error;
pub mod load;
pub mod prompt;
pub mod session;
pub mod stats;
pub mod sync;
pub mod types;

pub use error::LoadError;
