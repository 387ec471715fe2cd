//! Field metadata cache.
//!
//! Tag strings follow the grammar `name[,option...]`:
//!
//! | Tag | Effect |
//! |-----|--------|
//! | `-` | field is never serialized |
//! | `""` / `,omitempty` | wire name defaults to the field identifier |
//! | `id,attr` | rendered as an attribute of the enclosing element |
//! | `note,omitempty` | skipped when the value is empty |
//! | `tags>tag` | wrapped in a synthesized `<tags>` element, items named `tag` |
//!
//! Each record type is scanned once; the parsed list is published into a
//! process-wide copy-on-write map so steady-state lookups never take a lock.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;

use crate::value::{FieldDecl, XmlRecord};

/// Separator between wrapper element names in a tag.
pub const HIERARCHY_SEPARATOR: char = '>';

type FieldCache = HashMap<TypeId, Arc<[FieldMeta]>>;

static FIELD_CACHE: Lazy<ArcSwap<FieldCache>> = Lazy::new(|| ArcSwap::from_pointee(HashMap::new()));

/// Parsed form of a field's tag string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    pub name: String,
    pub attr: bool,
    pub omit_empty: bool,
}

impl TagSpec {
    /// Parses a tag string. Returns `None` for the exclusion marker `-`.
    pub fn parse(tag: &str, ident: &str) -> Option<Self> {
        if tag == "-" {
            return None;
        }

        let mut parts = tag.split(',');
        let name = parts.next().unwrap_or_default();
        let mut spec = TagSpec {
            name: if name.is_empty() { ident.to_string() } else { name.to_string() },
            attr: false,
            omit_empty: false,
        };

        for option in parts {
            match option.trim() {
                "attr" => spec.attr = true,
                "omitempty" => spec.omit_empty = true,
                _ => {}
            }
        }

        Some(spec)
    }
}

/// Everything the tree builder needs to know about one serializable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    /// Declaration index, passed back to [`XmlRecord::field`].
    pub index: usize,
    pub ident: &'static str,
    /// The name as written, possibly a `>` chain.
    pub wire_name: String,
    /// `wire_name` split into element names; never empty.
    pub path: Vec<String>,
    pub attr: bool,
    pub omit_empty: bool,
    pub embedded: bool,
    pub element_name: bool,
}

impl FieldMeta {
    fn from_decl(index: usize, decl: &FieldDecl) -> Option<Self> {
        let spec = TagSpec::parse(decl.tag.unwrap_or_default(), decl.ident)?;

        let mut path: Vec<String> = spec
            .name
            .split(HIERARCHY_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if path.is_empty() {
            path.push(decl.ident.to_string());
        }

        Some(FieldMeta {
            index,
            ident: decl.ident,
            wire_name: spec.name,
            path,
            attr: spec.attr,
            omit_empty: spec.omit_empty,
            embedded: decl.embedded,
            element_name: decl.element_name,
        })
    }

    /// Whether the field is wrapped in synthesized elements.
    pub fn is_nested(&self) -> bool {
        self.path.len() > 1
    }

    /// The element name the field's own value is built under.
    pub fn leaf_name(&self) -> &str {
        // `path` always holds at least one segment.
        self.path.last().map(String::as_str).unwrap_or(self.ident)
    }
}

/// Parses raw declarations into metadata, dropping excluded fields.
pub fn scan(decls: &[FieldDecl]) -> Vec<FieldMeta> {
    decls
        .iter()
        .enumerate()
        .filter_map(|(index, decl)| FieldMeta::from_decl(index, decl))
        .collect()
}

/// Returns the ordered field metadata for the record's type.
///
/// The first call for a type scans it; later calls are a lock-free map
/// lookup. Concurrent first calls may each scan, but only one list is ever
/// published and every caller gets that one.
pub fn field_metadata(record: &dyn XmlRecord) -> Arc<[FieldMeta]> {
    let key = record.type_key();
    if let Some(fields) = FIELD_CACHE.load().get(&key) {
        return Arc::clone(fields);
    }

    let fields: Arc<[FieldMeta]> = scan(&record.describe()).into();
    tracing::trace!(
        type_name = record.type_name(),
        fields = fields.len(),
        "cached XML field metadata"
    );

    FIELD_CACHE.rcu(|current| {
        let mut next = FieldCache::clone(current);
        next.entry(key).or_insert_with(|| Arc::clone(&fields));
        next
    });

    FIELD_CACHE
        .load()
        .get(&key)
        .map(Arc::clone)
        .unwrap_or(fields)
}

/// Number of record types currently cached.
pub fn cached_type_count() -> usize {
    FIELD_CACHE.load().len()
}
