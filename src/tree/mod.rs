//! In-memory namespace: nodes, path walking and mutation primitives.

mod node;
mod store;

#[cfg(test)]
mod tests;

pub use node::Node;
pub use store::{Resolve, Tree};
