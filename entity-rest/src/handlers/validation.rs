//! Request body validation
//!
//! Create and update bodies are validated before they reach the CRUD core.
//! Failures are grouped by field and rendered as a 422 with the
//! `VAL-4001` catalog entry.
//!
//! # Example
//!
//! ```rust
//! use entity_rest::handlers::{Validate, ValidationErrors};
//!
//! struct NewTag {
//!     name: String,
//! }
//!
//! impl Validate for NewTag {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         let mut errors = ValidationErrors::new();
//!         if self.name.trim().is_empty() {
//!             errors.add("name", "validation.required");
//!         }
//!         errors.into_result()
//!     }
//! }
//!
//! let err = NewTag { name: " ".into() }.validate().unwrap_err();
//! assert_eq!(err.messages("name"), ["validation.required"]);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field name to list of messages, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// No errors yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    /// Record `message` against `field` when `failed` is true
    pub fn check(&mut self, failed: bool, field: &str, message: &str) {
        if failed {
            self.add(field, message);
        }
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across fields
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Messages recorded for `field`
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// All fields and their messages
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        write!(f, "validation failed for: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validation of an incoming request body
pub trait Validate {
    /// Check every field, collecting all failures
    fn validate(&self) -> Result<(), ValidationErrors>;
}
