//! Types shared between the host bridge and the UI state layer.

pub mod domain;
pub mod error;
pub mod protocol;
