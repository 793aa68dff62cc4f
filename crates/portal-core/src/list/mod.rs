//! Tabular list views: one parameterised engine plus the controller that
//! feeds it from a remote fetch.

pub mod controller;
pub mod engine;
pub mod predicate;

pub use controller::*;
pub use engine::*;
pub use predicate::*;
