//! # Retouch
//!
//! An image edit-and-analysis core. Uploaded originals live in one pool,
//! every edit produces a brand-new image in a second pool, and any stored
//! image can be measured for brightness, contrast, and vibrancy.
//!
//! # Architecture
//!
//! Two independent operations sit on top of one storage seam:
//!
//! ```text
//! Edit      name + edits  →  resolve → decode → adjust → encode → derived pool
//! Analyze   name          →  resolve → decode → measure → classify → recommendations
//! ```
//!
//! Both take the store as an [`ImageStore`](store::ImageStore) trait object
//! or generic, so unit tests run against an in-memory store and never touch
//! the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Originals and derived pools; derived-first name resolution |
//! | [`pipeline`] | Applies brightness, contrast, grayscale in fixed order; persists the result |
//! | [`analysis`] | Mean luminance, luminance σ, saturation σ, and their recommendations |
//! | [`imaging`] | Decode/encode, pixel operations, histogram statistics, edit parameters |
//! | [`naming`] | Derived file names: `{base}_{tag}_{disambiguator}.png` |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`error`] | The error taxonomy shared by pipeline and analysis |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Edits Never Touch Their Source
//!
//! Originals are immutable once uploaded. Every edit writes a new file whose
//! name is derived from the source's base name, so chains of edits stay
//! traceable (`beach.jpg → beach_edited_… → beach_grayscale_…`) without the
//! names growing with each step.
//!
//! ## Lossless Derived Output
//!
//! Derived images are always PNG. Re-encoding with a lossy codec would make
//! two identical edits produce byte-different pixels across encoder versions,
//! and would compound artifacts along an edit chain.
//!
//! ## Fixed Edit Order
//!
//! Brightness, then contrast, then grayscale, regardless of the order keys
//! appear in the request. With rounding and clamping between steps the
//! operations don't commute, so the order is fixed rather than configurable.

pub mod analysis;
pub mod config;
pub mod error;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use analysis::{AnalysisEngine, AnalysisResult};
pub use error::{Error, ErrorKind, Result};
pub use imaging::EditRequest;
pub use pipeline::{DerivedArtifact, EditPipeline};
pub use store::{FsImageStore, ImageStore};
