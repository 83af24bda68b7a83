//! Region selection tools.

pub mod label;

pub use label::{label_components, Connectivity, Labels};
