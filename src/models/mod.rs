pub mod metadata;
pub mod tagset;

pub use metadata::*;
pub use tagset::*;
