//! Core data models for the clan war bot.

mod member;
mod stats;
mod tag;
mod war;

pub use member::*;
pub use stats::*;
pub use tag::*;
pub use war::*;
