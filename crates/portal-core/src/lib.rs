//! portal-core
//!
//! Business logic for the constituent portal: list engine, trip planner
//! wizard and map finder. Depends on portal-domain. No CLI, no terminal
//! I/O, no direct storage interactions; remote work goes through the
//! collaborator traits in [`remote`] and [`finder::remote`].

pub mod coerce;
pub mod error;
pub mod finder;
pub mod format;
pub mod list;
pub mod remote;
pub mod scope;
pub mod wizard;

pub use error::CoreError;
pub use list::{FilterSet, ListConfig, ListController, ListEngine, RowPredicate};
pub use remote::*;
pub use scope::ComponentScope;
pub use wizard::{SaveReport, TripWizard, WizardStep};
