// programs/parametric_insurance/src/instructions/mod.rs

pub mod coverage;
pub mod initialize;
pub mod resolution;
pub mod submission;
pub mod voting;

pub use coverage::*;
pub use initialize::*;
pub use resolution::*;
pub use submission::*;
pub use voting::*;
