//! Trip planner wizard.

pub mod forms;
pub mod orchestrator;
pub mod step;
pub mod validation;

pub use forms::*;
pub use orchestrator::*;
pub use step::*;
pub use validation::*;
