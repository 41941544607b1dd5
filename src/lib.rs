//! Deckwright - stable shape addressing and format-preserving mutation for
//! PowerPoint (.pptx) decks
//!
//! A template deck is filled in shape by shape. Every shape gets a key,
//! `"{slide_id}_{shape_id}"`, that outer systems use to say which shape a
//! piece of content belongs to. The crate provides:
//!
//! - **Addressing** ([`key`]): parse keys and resolve them to shapes
//! - **Heuristic** ([`heuristic`], [`assignment`]): attach a content
//!   assignment from an injectable table, plus geometry, to every key
//! - **Inventory** ([`inventory`]): list every shape's current content
//! - **Mutation** ([`mutate`]): replace text keeping the first run's
//!   formatting; replace pictures keeping height and horizontal center
//! - **Persistence** ([`store`]): atomic saves and per-document locks
//! - **Service** ([`service`]): the operations, wired to configuration,
//!   image fetching and an external renderer
//!
//! Everything that is not the target shape is written back as it was read.
//!
//! # Example
//!
//! ```no_run
//! use deckwright::key::PrimaryKey;
//! use deckwright::mutate::{self, TextPolicy};
//! use deckwright::store;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = store::load(Path::new("reference.pptx"))?;
//! let key: PrimaryKey = "256_3".parse()?;
//! mutate::replace_text(&mut pkg, &key, "New summary", TextPolicy::Collapse)?;
//! store::save(&mut pkg, Path::new("reference_updated.pptx"))?;
//! # Ok(())
//! # }
//! ```

pub mod assignment;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod image_source;
pub mod inventory;
pub mod key;
pub mod mutate;
pub mod ooxml;
pub mod plan;
pub mod render;
pub mod service;
pub mod store;

pub use assignment::{AssignmentTable, ContentAssignment, ResearchType};
pub use config::ServiceConfig;
pub use error::{DeckError, ErrorPayload, Result};
pub use heuristic::{Heuristic, HeuristicEntry};
pub use inventory::InventoryEntry;
pub use key::PrimaryKey;
pub use service::DeckService;
