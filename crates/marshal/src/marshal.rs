//! Entry points tying the pipeline together.

use std::io::Write;

use crate::builder::TreeBuilder;
use crate::compress::{Compressor, GzipCompressor};
use crate::encoder::Encoder;
use crate::error::{MarshalError, Result};
use crate::node::{Attribute, NodePool, XMLNS};
use crate::options::{MarshalOptions, XML_PROLOG};
use crate::pool::Pool;
use crate::value::{ValueRef, XmlValue};

static NODE_POOL: NodePool = NodePool::new();
static BUFFER_POOL: Pool<Vec<u8>> = Pool::new(64);
static COMPRESSOR_POOL: Pool<GzipCompressor> = Pool::new(16);

/// Marshals `value` into markup (or gzip-framed markup when
/// `options.compress` is set).
///
/// # Examples
///
/// ```rust
/// use helios_marshal::{MarshalOptions, XmlRecord, marshal};
///
/// #[derive(XmlRecord)]
/// struct Item {
///     #[xml("id,attr")]
///     id: u32,
///     #[xml("name")]
///     name: String,
/// }
///
/// let xml = marshal(&Item { id: 1, name: "Widget".into() }, &MarshalOptions::default())?;
/// assert_eq!(xml, br#"<Item id="1"><name>Widget</name></Item>"#);
/// # Ok::<(), helios_marshal::MarshalError>(())
/// ```
pub fn marshal<V>(value: &V, options: &MarshalOptions) -> Result<Vec<u8>>
where
    V: XmlValue,
{
    let mut document = BUFFER_POOL.acquire();
    render(value, options, &mut document)?;

    let bytes = if options.compress {
        let mut compressed = BUFFER_POOL.acquire();
        compress_into(&document, options, &mut compressed)?;
        tracing::debug!(
            bytes = document.len(),
            compressed = compressed.len(),
            "marshaled compressed XML document"
        );
        compressed.to_vec()
    } else {
        tracing::debug!(bytes = document.len(), "marshaled XML document");
        document.to_vec()
    };
    Ok(bytes)
}

/// Marshals `value` and writes the final bytes to `writer`.
pub fn marshal_to_writer<V, W>(value: &V, options: &MarshalOptions, mut writer: W) -> Result<()>
where
    V: XmlValue,
    W: Write,
{
    let mut document = BUFFER_POOL.acquire();
    render(value, options, &mut document)?;

    if options.compress {
        let mut compressed = BUFFER_POOL.acquire();
        compress_into(&document, options, &mut compressed)?;
        writer.write_all(&compressed)?;
    } else {
        writer.write_all(&document)?;
    }
    writer.flush()?;
    Ok(())
}

/// Builds and encodes the document into `out`.
fn render(value: &dyn XmlValue, options: &MarshalOptions, out: &mut Vec<u8>) -> Result<()> {
    let root_path = options.root_path();
    let path: Vec<&str> = if !root_path.is_empty() {
        root_path
    } else {
        match value.as_value() {
            ValueRef::Null => return Err(MarshalError::NilRoot),
            ValueRef::Record(record) => vec![record.type_name()],
            other => {
                return Err(MarshalError::MissingTag {
                    what: other.describe_kind(),
                });
            }
        }
    };

    let mut root = TreeBuilder::new(options, &NODE_POOL)
        .build(value, &path)?
        .ok_or(MarshalError::NilRoot)?;

    if !options.namespace.is_empty() && !root.has_attribute(XMLNS) {
        root.insert_attribute_first(Attribute::new(XMLNS, options.namespace.as_str()));
    }

    if options.include_prolog {
        out.extend_from_slice(XML_PROLOG.as_bytes());
        if options.is_pretty() {
            out.push(b'\n');
        }
    }

    Encoder::new(out, options, &NODE_POOL).encode(root)
}

fn compress_into(document: &[u8], options: &MarshalOptions, out: &mut Vec<u8>) -> Result<()> {
    let mut compressor = COMPRESSOR_POOL.acquire();
    compressor.set_level(options.compression_level);
    compressor
        .compress(document, out)
        .map_err(MarshalError::Compression)
}

/// Idle `(elements, texts, buffers)` in the process-wide pools.
pub fn pool_stats() -> (usize, usize, usize) {
    let (elements, texts) = NODE_POOL.idle();
    (elements, texts, BUFFER_POOL.idle())
}
