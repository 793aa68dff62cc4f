//! portal-domain
//!
//! Pure data models for the constituent portal: fetched rows, list column
//! descriptors, trip itinerary entities and map finder filter types.
//! No I/O, no async, no storage. Only data types and core enums.

pub mod column;
pub mod common;
pub mod finder;
pub mod row;
pub mod trip;

pub use column::*;
pub use common::*;
pub use finder::*;
pub use row::*;
pub use trip::*;
