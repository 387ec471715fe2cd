//! Builds the node tree for a value.
//!
//! The builder walks a value guided by a tag path: the head of the path
//! names the element being built and the tail is handed to sequence items.
//! Records consult the field metadata cache to decide, per field, between
//! attributes, child elements, synthesized wrapper chains and embedded
//! flattening.

use crate::error::{MarshalError, Result};
use crate::meta::{FieldMeta, field_metadata};
use crate::node::{Attribute, Element, Node, NodePool};
use crate::options::MarshalOptions;
use crate::value::{Scalar, ValueRef, XmlRecord, XmlSequence, XmlValue};

pub struct TreeBuilder<'a> {
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    options: &'a MarshalOptions,
    pool: &'a NodePool,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(options: &'a MarshalOptions, pool: &'a NodePool) -> Self {
        Self { options, pool }
    }

    /// Builds the element for `value`, or `None` when the value is null.
    ///
    /// Records without a path use their type name; sequences and scalars
    /// need at least one path segment.
    pub fn build(&self, value: &dyn XmlValue, path: &[&str]) -> Result<Option<Box<Element>>> {
        match value.as_value() {
            ValueRef::Null => Ok(None),
            ValueRef::Record(record) => {
                let name = path.first().copied().unwrap_or_else(|| record.type_name());
                self.build_record(record, name).map(Some)
            }
            ValueRef::Sequence(seq) => {
                let (name, rest) = path
                    .split_first()
                    .ok_or(MarshalError::MissingTag { what: "sequence" })?;
                self.build_sequence(seq, name, rest).map(Some)
            }
            ValueRef::Scalar(scalar) => {
                let name = path
                    .first()
                    .ok_or(MarshalError::MissingTag { what: "scalar" })?;
                Ok(Some(self.build_scalar(scalar, name)))
            }
        }
    }

    fn build_scalar(&self, scalar: Scalar<'_>, name: &str) -> Box<Element> {
        let mut element = self.pool.element(name);
        let mut text = self.pool.text();
        scalar.write_to(&mut text.content);
        element.children.push(Node::Text(text));
        element
    }

    fn build_record(&self, record: &dyn XmlRecord, name: &str) -> Result<Box<Element>> {
        let mut element = self.pool.element(name);
        let fields = field_metadata(record);

        for field in fields.iter() {
            if let Err(err) = self.add_field(&mut element, record, field) {
                self.pool.release_element(element);
                return Err(err.within(format!("field `{}`", field.ident)));
            }
        }

        Ok(element)
    }

    fn add_field(
        &self,
        element: &mut Element,
        record: &dyn XmlRecord,
        field: &FieldMeta,
    ) -> Result<()> {
        let Some(value) = record.field(field.index) else {
            return Err(MarshalError::MissingTag { what: "record field" });
        };
        let shape = value.as_value();

        if field.element_name {
            if let ValueRef::Scalar(Scalar::Str(local)) = shape {
                if !local.is_empty() {
                    element.name.clear();
                    element.name.push_str(local);
                }
            }
            return Ok(());
        }

        if field.embedded {
            return self.splice_embedded(element, value);
        }

        if field.omit_empty && shape.is_empty() {
            return Ok(());
        }

        if field.attr {
            let text = match shape {
                ValueRef::Null => String::new(),
                ValueRef::Scalar(scalar) => scalar.to_text().into_owned(),
                ValueRef::Record(_) | ValueRef::Sequence(_) => {
                    return Err(MarshalError::InvalidAttribute {
                        name: field.wire_name.clone(),
                    });
                }
            };
            element
                .attributes
                .push(Attribute::new(field.wire_name.as_str(), text));
            return Ok(());
        }

        self.add_child_elements(element, value, field)
    }

    /// Builds the embedded record and moves its attributes and children
    /// into `element`. The embedded element's own name is discarded.
    fn splice_embedded(&self, element: &mut Element, value: &dyn XmlValue) -> Result<()> {
        let shape = value.as_value();
        if !matches!(shape, ValueRef::Null | ValueRef::Record(_)) {
            return Err(MarshalError::MissingTag {
                what: shape.describe_kind(),
            });
        }

        if let Some(mut embedded) = self.build(value, &[])? {
            element.attributes.append(&mut embedded.attributes);
            element.children.append(&mut embedded.children);
            self.pool.release_element(embedded);
        }
        Ok(())
    }

    /// Attaches the field's element(s) under `element`, inside the wrapper
    /// chain described by the field path. Sequence items are appended one by
    /// one under the innermost wrapper, each named by the last segment.
    fn add_child_elements(
        &self,
        element: &mut Element,
        value: &dyn XmlValue,
        field: &FieldMeta,
    ) -> Result<()> {
        let (leaf, wrappers) = match field.path.split_last() {
            Some((leaf, wrappers)) => (leaf.as_str(), wrappers),
            None => (field.ident, &[][..]),
        };

        let mut built = Vec::new();
        match value.as_value() {
            ValueRef::Sequence(seq) => {
                if let Err(err) = self.build_items(seq, &[leaf], leaf, &mut built) {
                    self.release_all(built);
                    return Err(err);
                }
            }
            _ => {
                if let Some(child) = self.build(value, &[leaf])? {
                    built.push(Node::Element(child));
                }
            }
        }

        let mut content = built;
        for name in wrappers.iter().rev() {
            let mut wrapper = self.pool.element(name);
            wrapper.children = content;
            content = vec![Node::Element(wrapper)];
        }
        element.children.append(&mut content);
        Ok(())
    }

    fn build_sequence(
        &self,
        seq: &dyn XmlSequence,
        name: &str,
        rest: &[&str],
    ) -> Result<Box<Element>> {
        let mut element = self.pool.element(name);
        if let Err(err) = self.build_items(seq, rest, name, &mut element.children) {
            self.pool.release_element(element);
            return Err(err);
        }
        Ok(element)
    }

    /// Builds every item of `seq` with `path`, appending them to `out` in
    /// input order. Null items are skipped.
    fn build_items(
        &self,
        seq: &dyn XmlSequence,
        path: &[&str],
        name: &str,
        out: &mut Vec<Node>,
    ) -> Result<()> {
        #[cfg(feature = "parallel")]
        if self.options.parallel_threshold > 0 && seq.len() >= self.options.parallel_threshold {
            return self.build_items_parallel(seq, path, name, out);
        }

        out.reserve(seq.len());
        for index in 0..seq.len() {
            match self.build_item(seq, index, path, name)? {
                Some(child) => out.push(Node::Element(child)),
                None => continue,
            }
        }
        Ok(())
    }

    fn build_item(
        &self,
        seq: &dyn XmlSequence,
        index: usize,
        path: &[&str],
        name: &str,
    ) -> Result<Option<Box<Element>>> {
        let Some(item) = seq.item(index) else {
            return Ok(None);
        };
        self.build(item, path)
            .map_err(|err| err.within(format!("item {index} of {name}")))
    }

    /// Builds all items concurrently into an index-addressed result vector.
    /// Every item runs to completion; on failure the lowest-index error is
    /// returned and all successfully built items are released.
    #[cfg(feature = "parallel")]
    fn build_items_parallel(
        &self,
        seq: &dyn XmlSequence,
        path: &[&str],
        name: &str,
        out: &mut Vec<Node>,
    ) -> Result<()> {
        use rayon::prelude::*;

        let results: Vec<Result<Option<Box<Element>>>> = (0..seq.len())
            .into_par_iter()
            .map(|index| self.build_item(seq, index, path, name))
            .collect();

        let mut first_error = None;
        let mut built = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(Some(child)) => built.push(Node::Element(child)),
                Ok(None) => {}
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        if let Some(err) = first_error {
            self.release_all(built);
            return Err(err);
        }
        out.append(&mut built);
        Ok(())
    }

    fn release_all(&self, nodes: Vec<Node>) {
        for node in nodes {
            self.pool.release(node);
        }
    }
}
