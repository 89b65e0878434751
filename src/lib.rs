//! # Clan War Bot
//!
//! Clash of Clans clan war statistics, delivered over Telegram.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (members, war windows, stats rows)
//! - **fetch**: Authenticated JSON fetching with explicit "unavailable" results
//! - **coc**: Clash of Clans API client and response types
//! - **calculate**: Merges regular and league war attacks into per-member rows
//! - **report**: Ranking, war summary and spreadsheet presenters
//! - **bot**: Chat commands, Telegram client and long polling
//! - **api**: Webhook HTTP endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod bot;
pub mod calculate;
pub mod coc;
pub mod config;
pub mod fetch;
pub mod models;
pub mod report;

pub use models::*;
