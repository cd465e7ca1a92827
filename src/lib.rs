//! # igesrust
//!
//! A pure Rust library for reading, writing, and manipulating CAD models
//! in IGES 5.3 format — the fixed-column ASCII format used to exchange
//! curves, surfaces, and assembly structure between mechanical design
//! systems.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use igesrust::{IgesDocument, entities::EntityType, types::Point3};
//!
//! // Read an IGES file
//! let mut doc = IgesDocument::new();
//! doc.read("sample.igs")?;
//!
//! // Access entities
//! for entity in doc.entities() {
//!     println!("Entity type: {}", entity.type_code());
//! }
//!
//! // Build and write a model
//! let mut doc = IgesDocument::new();
//! let id = doc.new_entity(110);
//! if let Some(EntityType::Line(line)) = doc.entity_mut(id) {
//!     line.end = Point3::new(1.0, 2.0, 3.0);
//! }
//! doc.write("output.igs", true)?;
//! # Ok::<(), igesrust::error::IgesError>(())
//! ```
//!
//! ## Architecture
//!
//! - `IgesDocument` — the model: global data plus the ordered entity table,
//!   which exclusively owns every entity
//! - `Entity` / `EntityType` — the trait and variant enum over the typed
//!   entity kinds; unknown type codes round-trip through `NullEntity`
//! - `io` — the 80-column record layer, the delimiter-parametric parameter
//!   codec, and the two-pass reader / renumbering writer
//!
//! Entities reference each other by `EntityId`. Every forward pointer is
//! mirrored in the target's back-reference list, ids are never reused, and
//! all link mutations go through document operations so both sides stay
//! consistent.

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod document;
pub mod entities;
pub mod error;
pub mod global;
pub mod io;
pub mod notification;
pub mod types;

// Re-export commonly used types
pub use document::IgesDocument;
pub use error::{IgesError, Result};
pub use global::{GlobalData, Units};
pub use types::{EntityId, Point3, StatusNumber, Transform};

// Re-export entity types
pub use entities::{Entity, EntityType, NullEntity};

// Re-export I/O types
pub use io::{IgesReader, IgesReaderConfiguration, IgesWriter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
