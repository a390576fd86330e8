//! Common types shared by the cache and search crates.

mod chunk;
mod common;
mod result;

pub use chunk::*;
pub use common::*;
pub use result::*;
