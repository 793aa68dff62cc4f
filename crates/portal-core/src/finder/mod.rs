//! Map-based constituent finder.

pub mod criteria;
pub mod export;
pub mod markers;
pub mod paging;
pub mod remote;
pub mod search;
pub mod selection;

pub use criteria::*;
pub use export::*;
pub use markers::*;
pub use paging::*;
pub use remote::*;
pub use search::*;
pub use selection::*;
