use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::StyleModifier;
use crate::error::CatalogError;

/// Additions and replacements applied on top of a catalog at startup.
///
/// ```json
/// {
///   "palette": { "teal": "#2AA198" },
///   "categories": [
///     { "name": "property", "color": "teal" },
///     { "name": "todo marker", "color": "#FFCC00", "pattern": "TODO|FIXME" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogOverride {
    #[serde(default)]
    pub palette: BTreeMap<String, String>,
    #[serde(default)]
    pub categories: Vec<CategoryOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOverride {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<StyleModifier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specificity: Option<u16>,
}

impl CategoryOverride {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            color: None,
            modifiers: None,
            aliases: None,
            pattern: None,
            specificity: None,
        }
    }
}

impl CatalogOverride {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let serialized =
            serde_json::to_string_pretty(self).map_err(|source| CatalogError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, serialized).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
