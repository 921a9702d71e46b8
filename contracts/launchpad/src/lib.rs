pub mod contract;
mod error;
pub mod intervals;
pub mod msg;
pub mod phase;
pub mod pricing;
pub mod query;
pub mod queue;
pub mod randomness;
pub mod registry;
pub mod reveal;
pub mod state;

#[cfg(test)]
mod testing;
