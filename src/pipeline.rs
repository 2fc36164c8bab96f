//! Edit Pipeline: one request in, one new derived image out.
//!
//! Edits are applied in a fixed canonical order no matter how the request
//! was keyed:
//!
//! ```text
//! resolve → decode → RGB → brightness → contrast → grayscale → encode → store
//! ```
//!
//! Brightness-then-contrast is not the same as contrast-then-brightness once
//! rounding and clamping are involved, so the order is part of the contract.
//!
//! Nothing is written until the final step. Any failure before it (missing
//! source, corrupt bytes, encode error) leaves the store untouched. A derived
//! name already taken by another writer is skipped, never overwritten.

use crate::error::{Error, Result};
use crate::imaging::{self, EditRequest};
use crate::naming::{Disambiguator, derived_file_name};
use crate::store::{ImageStore, StoreError};
use serde::Serialize;
use tracing::{debug, info};

/// Names tried per edit before a collision is reported as a write failure.
const MAX_NAME_ATTEMPTS: usize = 16;

/// A persisted edit result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedArtifact {
    /// File name in the derived pool.
    pub name: String,
    /// The name the edit was applied to.
    pub source: String,
    pub width: u32,
    pub height: u32,
}

/// Applies [`EditRequest`]s to images held in an [`ImageStore`].
///
/// Holds the disambiguator, so one pipeline shared across threads still
/// produces distinct names for concurrent edits of the same source.
pub struct EditPipeline<'a, S: ImageStore + ?Sized> {
    store: &'a S,
    disambiguator: Disambiguator,
}

impl<'a, S: ImageStore + ?Sized> EditPipeline<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::with_disambiguator(store, Disambiguator::new())
    }

    pub fn with_disambiguator(store: &'a S, disambiguator: Disambiguator) -> Self {
        Self {
            store,
            disambiguator,
        }
    }

    /// Apply `edits` to `source` and persist the result as a new artifact.
    pub fn apply(&self, source: &str, edits: &EditRequest) -> Result<DerivedArtifact> {
        let bytes = self.store.resolve(source)?;
        let mut image = imaging::decode(source, &bytes)?.into_rgb8();

        if let Some(factor) = edits.brightness {
            debug!(source, factor = factor.value(), "applying brightness");
            imaging::adjust_brightness(&mut image, factor.value());
        }
        if let Some(factor) = edits.contrast {
            debug!(source, factor = factor.value(), "applying contrast");
            imaging::adjust_contrast(&mut image, factor.value());
        }
        if edits.grayscale {
            debug!(source, "applying grayscale");
            image = imaging::to_grayscale(&image);
        }

        let encoded = imaging::encode_png(&image).map_err(|e| Error::StorageWrite {
            name: source.to_string(),
            source: std::io::Error::other(e),
        })?;
        let name = self.store_derived(source, edits.tag(), &encoded)?;

        info!(source, derived = %name, "stored edit");
        Ok(DerivedArtifact {
            name,
            source: source.to_string(),
            width: image.width(),
            height: image.height(),
        })
    }

    /// Write `encoded` under a fresh derived name.
    ///
    /// Another writer may already hold the name drawn (a second pipeline on
    /// the same store, or another process). The store never overwrites, so
    /// a taken name just means drawing the next disambiguator.
    fn store_derived(&self, source: &str, tag: &str, encoded: &[u8]) -> Result<String> {
        let mut attempts = 0;
        loop {
            let name = derived_file_name(source, tag, self.disambiguator.next());
            attempts += 1;
            match self.store.put_derived(encoded, &name) {
                Ok(stored) => return Ok(stored),
                Err(StoreError::AlreadyExists(_)) if attempts < MAX_NAME_ATTEMPTS => {
                    debug!(source, taken = %name, "derived name taken, drawing another");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Parse `edits` from JSON, then [`apply`](Self::apply) them.
    ///
    /// Parameter errors are reported before the source is even resolved.
    pub fn apply_json(&self, source: &str, edits: &serde_json::Value) -> Result<DerivedArtifact> {
        let request = EditRequest::from_json(edits)?;
        self.apply(source, &request)
    }
}
