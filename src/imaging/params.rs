//! Edit parameters.
//!
//! [`EditRequest`] describes *what* to do to an image, not *how*. It is
//! built from an unordered JSON object (the shape clients send) and
//! validated up front, so the pipeline never starts work on a request it
//! would have to reject halfway through.
//!
//! ## Recognized keys
//!
//! | Key | Shape | Meaning |
//! |---|---|---|
//! | `brightness` | finite number ≥ 0 | channel multiplier, 1.0 = unchanged |
//! | `contrast` | finite number ≥ 0 | contrast multiplier, 1.0 = unchanged |
//! | `grayscale` | bool, number, or `"true"`/`"false"`/`"1"`/`"0"` | truthy converts to gray |
//!
//! Unknown keys are ignored. `null` for a recognized key means "not set".

use crate::error::{Error, Result};
use crate::naming::{EDITED_TAG, GRAYSCALE_TAG};
use serde::Serialize;
use serde_json::Value;

/// A validated, non-negative, finite multiplicative factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Factor(f32);

impl Factor {
    /// Validate `value` as the factor for parameter `name`.
    pub fn new(name: &str, value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::invalid_parameter(name, "must be a finite number"));
        }
        if value < 0.0 {
            return Err(Error::invalid_parameter(
                name,
                format!("must not be negative, got {value}"),
            ));
        }
        if value > f64::from(f32::MAX) {
            return Err(Error::invalid_parameter(name, "is out of range"));
        }
        Ok(Self(value as f32))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

/// The set of edits to apply to one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<Factor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<Factor>,
    pub grayscale: bool,
}

impl EditRequest {
    /// Parse a JSON object of edit parameters.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(map) = value.as_object() else {
            return Err(Error::invalid_parameter(
                "edits",
                "expected a JSON object of edit parameters",
            ));
        };

        let mut request = Self::default();
        if let Some(v) = map.get("brightness") {
            request.brightness = parse_factor("brightness", v)?;
        }
        if let Some(v) = map.get("contrast") {
            request.contrast = parse_factor("contrast", v)?;
        }
        if let Some(v) = map.get("grayscale") {
            request.grayscale = parse_truthy("grayscale", v)?;
        }
        Ok(request)
    }

    /// Parse edit parameters from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::invalid_parameter("edits", format!("invalid JSON: {e}")))?;
        Self::from_json(&value)
    }

    /// Suffix tag for the derived file name.
    ///
    /// A request whose only edit is grayscale is tagged `grayscale`; anything
    /// else (including an empty request) is tagged `edited`.
    pub fn tag(&self) -> &'static str {
        if self.grayscale && self.brightness.is_none() && self.contrast.is_none() {
            GRAYSCALE_TAG
        } else {
            EDITED_TAG
        }
    }
}

fn parse_factor(name: &str, value: &Value) -> Result<Option<Factor>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            let f = n
                .as_f64()
                .ok_or_else(|| Error::invalid_parameter(name, "is not representable"))?;
            Factor::new(name, f).map(Some)
        }
        other => Err(Error::invalid_parameter(
            name,
            format!("expected a number, got {}", json_type(other)),
        )),
    }
}

fn parse_truthy(name: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" | "" => Ok(false),
            _ => Err(Error::invalid_parameter(
                name,
                format!("{s:?} is not a boolean"),
            )),
        },
        other => Err(Error::invalid_parameter(
            name,
            format!("expected a boolean, got {}", json_type(other)),
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
