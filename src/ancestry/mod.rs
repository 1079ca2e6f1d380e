pub mod sosa;

pub use sosa::{AncestorNumber, InvalidAncestorNumber, Sex};
