//! Marshal configuration.
//!
//! All options are independent of each other. Construct them
//! programmatically or load them from JSON:
//!
//! ```rust
//! use helios_marshal::MarshalOptions;
//!
//! let options = MarshalOptions {
//!     indent: "  ".to_string(),
//!     include_prolog: true,
//!     ..Default::default()
//! };
//!
//! let loaded = MarshalOptions::from_json_str(r#"{"indent": "  ", "include_prolog": true}"#)?;
//! assert_eq!(options, loaded);
//! # Ok::<(), helios_marshal::MarshalError>(())
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Fixed document prolog.
pub const XML_PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Default gzip level.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Default minimum sequence length for parallel item builds.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshalOptions {
    /// Indentation unit. Empty disables pretty-printing.
    pub indent: String,

    /// Emit the `<?xml ...?>` prolog.
    pub include_prolog: bool,

    /// Default namespace URI injected on the root element. Empty disables.
    pub namespace: String,

    /// Root element name. Empty uses the value's type name. May be a `>`
    /// chain so a sequence root can name its items (`items>item`).
    pub root_tag: String,

    /// Gzip the output.
    pub compress: bool,

    /// Gzip level, 0 (store) to 9 (best).
    pub compression_level: u32,

    /// Tag names rendered as `<name/>` when they have no meaningful content.
    pub self_closing_tags: HashSet<String>,

    /// Render self-closing tags as `<name />`.
    pub spaced_self_close: bool,

    /// Sequences at least this long build their items in parallel when the
    /// `parallel` feature is enabled.
    pub parallel_threshold: usize,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        Self {
            indent: String::new(),
            include_prolog: false,
            namespace: String::new(),
            root_tag: String::new(),
            compress: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            self_closing_tags: HashSet::new(),
            spaced_self_close: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl MarshalOptions {
    /// Loads options from a JSON document; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Adds tag names to the self-closing set.
    pub fn with_self_closing<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.self_closing_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn is_pretty(&self) -> bool {
        !self.indent.is_empty()
    }

    pub fn is_self_closing(&self, name: &str) -> bool {
        self.self_closing_tags.contains(name)
    }

    /// Root tag override split into path segments; empty when unset.
    pub fn root_path(&self) -> Vec<&str> {
        self.root_tag
            .split(crate::meta::HIERARCHY_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}
