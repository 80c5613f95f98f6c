//! Component registry: construction order, linking and enable/disable.

mod base;
mod manager;

pub use base::{Factory, FactoryBase, FactoryContext, subscribe};
pub use manager::{FactoryEntry, FactoryManager, FactorySpec, WeakFactoryManager};
