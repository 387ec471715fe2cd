//! # Helios XML Marshaling
//!
//! This crate converts Rust records into XML under a declarative, per-field
//! tag configuration, and optionally gzips the result.
//!
//! ## Pipeline
//!
//! 1. **Field metadata**: each record type is scanned once (the scan is
//!    generated by `#[derive(XmlRecord)]`) and the parsed field list is
//!    cached for the life of the process.
//! 2. **Tree building**: the value is walked under a tag path and turned
//!    into a tree of pooled [`node::Element`] and [`node::Text`] nodes.
//! 3. **Encoding**: the tree is written depth-first with escaping,
//!    indentation and self-closing rules; nodes go back to the pool as soon
//!    as they are written.
//! 4. **Compression** (optional): the finished buffer is gzip-framed.
//!
//! ## Field tags
//!
//! | Tag | Effect |
//! |-----|--------|
//! | *(none)* | child element named after the field |
//! | `#[xml("id,attr")]` | attribute of the enclosing element |
//! | `#[xml("note,omitempty")]` | omitted when zero, empty or `None` |
//! | `#[xml("tags>tag")]` | `<tags><tag>..</tag><tag>..</tag></tags>` |
//! | `#[xml("-")]` | never serialized |
//! | `#[xml(embed)]` | fields of the embedded record are flattened into the parent |
//!
//! A field of type [`XmlName`] renames the enclosing element.
//!
//! ## Example
//!
//! ```rust
//! use helios_marshal::{MarshalOptions, XmlRecord, marshal};
//!
//! #[derive(XmlRecord)]
//! struct Entry {
//!     #[xml("id,attr")]
//!     id: u32,
//!     #[xml("Name")]
//!     name: String,
//!     #[xml("tags>tag,omitempty")]
//!     tags: Vec<String>,
//! }
//!
//! let entry = Entry {
//!     id: 1,
//!     name: "TestName".to_string(),
//!     tags: vec!["a".to_string(), "b".to_string()],
//! };
//! let options = MarshalOptions {
//!     indent: "  ".to_string(),
//!     include_prolog: true,
//!     root_tag: "CustomRootTag".to_string(),
//!     ..Default::default()
//! };
//!
//! let xml = marshal(&entry, &options)?;
//! assert_eq!(
//!     String::from_utf8(xml).unwrap(),
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<CustomRootTag id=\"1\">\n  <Name>TestName</Name>\n  <tags>\n    <tag>a</tag>\n    <tag>b</tag>\n  </tags>\n</CustomRootTag>"
//! );
//! # Ok::<(), helios_marshal::MarshalError>(())
//! ```

pub mod builder;
pub mod compress;
pub mod encoder;
pub mod error;
mod marshal;
pub mod meta;
pub mod node;
pub mod options;
pub mod pool;
pub mod value;

pub use error::{ErrorKind, MarshalError, Result};
pub use marshal::{marshal, marshal_to_writer, pool_stats};
pub use options::MarshalOptions;
pub use value::{FieldDecl, Scalar, ValueRef, XmlName, XmlRecord, XmlSequence, XmlValue};

#[cfg(feature = "derive")]
pub use helios_marshal_macro::XmlRecord;
