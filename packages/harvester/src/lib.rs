//! Pontoon Harvester - Fetch localization data from a Pontoon server.
//!
//! This crate harvests translatable strings ("entities") together with their
//! translation history, and the list of available locales, from a
//! Pontoon-compatible server. Every record is wrapped in an [`Envelope`]
//! carrying a deterministic uuid so repeated runs can be deduplicated.
//!
//! # Example
//!
//! ```
//! use pontoon_harvester::{identity, Pontoon};
//!
//! let pontoon = Pontoon::new("https://pontoon.example.com", "es").unwrap();
//! assert_eq!(pontoon.origin(), "https://pontoon.example.com/es");
//!
//! // Entities are identified by origin and primary key
//! let uuid = identity::uuid(&[pontoon.origin(), "280952"]).unwrap();
//! assert_eq!(uuid, "9dc5c9c9cb1319c7cd397f12570632f7a152af5a");
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`config`]: Configuration constants, endpoints and validation
//! - [`types`]: Core data types (Entity, LocaleRecord, Envelope, etc.)
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client construction and response decoding
//! - [`identity`]: Deterministic record identity
//! - [`client`]: Pontoon transport client (entity search, history, locales)
//! - [`harvester`]: Main harvester service
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod harvester;
pub mod http;
pub mod identity;
pub mod types;

// Re-export main types
pub use client::PontoonClient;
pub use harvester::{Items, Pontoon, PontoonBuilder};

// Re-export commonly used items
pub use config::{parse_from_date, validate_base_url};
pub use error::{HarvesterError, Result};
pub use types::{Category, Entity, Envelope, Item, LocaleRecord, Project, SearchFields};
