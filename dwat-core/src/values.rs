//! The Helm values document that records synced dashboards.
//!
//! # Layout
//!
//! ```text
//! dashboards:
//!   <uid>:
//!     title: ...
//!     tags: [...]
//!     folder_uid: ...
//!     folder_title: ...
//!     json: '<dashboard model as a JSON string>'
//! <any other chart values, preserved verbatim>
//! ```
//!
//! The document is held as an untyped [`serde_yaml::Mapping`] so keys this
//! tool does not own survive a rewrite in their original order.

use serde_yaml::{Mapping, Value};

use crate::error::CoreError;
use crate::types::DriftRecord;

/// Top-level key every tracked dashboard is nested under.
pub const ROOT_KEY: &str = "dashboards";

/// A parsed values file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValuesDocument {
    root: Mapping,
}

impl ValuesDocument {
    /// A document with no keys at all, not even [`ROOT_KEY`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse YAML text read from `path` (used for error context only).
    ///
    /// An empty file is an empty document. A `dashboards:` key with no value
    /// is normalized to an empty mapping.
    pub fn parse(path: &str, text: &str) -> Result<Self, CoreError> {
        let value: Value = serde_yaml::from_str(text).map_err(|source| CoreError::Parse {
            path: path.to_string(),
            source,
        })?;
        let mut root = match value {
            Value::Null => Mapping::new(),
            Value::Mapping(m) => m,
            _ => {
                return Err(CoreError::NotAMapping {
                    path: path.to_string(),
                })
            }
        };
        if let Some(slot) = root.get_mut(ROOT_KEY) {
            if slot.is_null() {
                *slot = Value::Mapping(Mapping::new());
            }
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// The `uid -> entry` mapping under [`ROOT_KEY`].
    pub fn dashboards(&self) -> Result<&Mapping, CoreError> {
        match self.root.get(ROOT_KEY) {
            None => Err(CoreError::MissingRootKey { key: ROOT_KEY }),
            Some(Value::Mapping(m)) => Ok(m),
            Some(_) => Err(CoreError::RootKeyNotAMapping { key: ROOT_KEY }),
        }
    }

    fn dashboards_mut(&mut self) -> Result<&mut Mapping, CoreError> {
        match self.root.get_mut(ROOT_KEY) {
            None => Err(CoreError::MissingRootKey { key: ROOT_KEY }),
            Some(Value::Mapping(m)) => Ok(m),
            Some(_) => Err(CoreError::RootKeyNotAMapping { key: ROOT_KEY }),
        }
    }

    /// A copy of this document with the drifted dashboard's entry replaced
    /// wholesale. `self` is left untouched.
    pub fn with_dashboard(&self, drift: &DriftRecord) -> Result<Self, CoreError> {
        let mut updated = self.clone();
        merge_into(updated.dashboards_mut()?, drift)?;
        Ok(updated)
    }

    pub fn to_yaml(&self) -> Result<String, CoreError> {
        Ok(serde_yaml::to_string(&self.root)?)
    }
}

/// Overwrite or append `dashboards[drift.uid]` in place.
///
/// Replacing an existing key keeps its position.
pub fn merge_into(dashboards: &mut Mapping, drift: &DriftRecord) -> Result<(), CoreError> {
    for (uid, entry) in drift.to_mapping()? {
        dashboards.insert(uid, entry);
    }
    Ok(())
}

/// Tags recorded for an entry, if it has a well-formed `tags` string list.
pub fn recorded_tags(entry: &Value) -> Option<Vec<String>> {
    entry
        .get("tags")
        .and_then(|tags| serde_yaml::from_value(tags.clone()).ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
