//! Pipeline module - the analysis steps from raw trips to ordered matrices

pub mod crosstab;
pub mod loader;
pub mod seriation;
pub mod shares;
pub mod trips;

pub use crosstab::*;
pub use loader::*;
pub use seriation::*;
pub use shares::*;
pub use trips::*;
