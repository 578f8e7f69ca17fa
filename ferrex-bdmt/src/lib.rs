//! # Ferrex BDMT
//!
//! Blu-ray disc title lookup for the Ferrex scanner.
//!
//! A Blu-ray structure carries its human readable title in a `bdmt_eng.xml`
//! descriptor, usually under `BDMV/META/DL/`. This crate checks
//! `BDMV/META/bdmt_eng.xml` and `META/bdmt_eng.xml` first, reaches `DL/`
//! and any other location through a recursive search, and extracts
//! `discinfo/title/name` the way BDInfo does:
//!
//! - [`locator`]: fixed locations first, then a recursive search per spelling
//! - [`metadata`]: namespace-aware extraction with the `Blu-ray`
//!   placeholder filtered out
//! - [`title`]: one-call lookups that never fail, plus a batch form
//! - [`config`]: walk tuning loaded from env, TOML or JSON
//!
//! ```no_run
//! use ferrex_bdmt::get_disc_title;
//!
//! if let Some(title) = get_disc_title("/mnt/discs/THE_MATRIX") {
//!     println!("{title}");
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Locator walk settings
pub mod config;
/// Error types
pub mod error;
/// Descriptor lookup under a disc root
pub mod locator;
/// Descriptor parsing
pub mod metadata;
/// Convenience and batch lookups
pub mod title;

pub use config::{LocatorConfig, LocatorConfigSource};
pub use error::{BdmtError, Result};
pub use locator::{Locator, find_metadata_file};
pub use metadata::MetadataFile;
pub use title::{DiscTitle, get_disc_title, get_disc_title_with, get_disc_titles};
