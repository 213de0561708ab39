//! Helper functions shared by the content store and the CLI

mod date;

pub use date::*;
