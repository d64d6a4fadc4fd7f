#![forbid(unsafe_code)]

mod matcher;
mod plan;
mod rank;
mod types;

pub use matcher::*;
pub use plan::*;
pub use rank::*;
pub use types::*;
