//! XMP document decoding.
//!
//! The reassembled XMP stream is a run of independent `x:xmpmeta` documents.
//! Each is decoded with a namespace-aware pull parser; only the attributes
//! used for depth and container extraction are kept. Matching is done on
//! namespace URI and local name, so documents that bind the usual prefixes to
//! other names still decode.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::debug;

use crate::error::XmpError;

// =============================================================================
// Namespaces
// =============================================================================

/// Namespace of the `xmpmeta` root element
pub const NS_META: &[u8] = b"adobe:ns:meta/";

/// RDF syntax namespace
pub const NS_RDF: &[u8] = b"http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Legacy depth map namespace (GDepth)
pub const NS_GDEPTH: &[u8] = b"http://ns.google.com/photos/1.0/depthmap/";

/// Legacy secondary image namespace (GImage)
pub const NS_GIMAGE: &[u8] = b"http://ns.google.com/photos/1.0/image/";

/// Dynamic depth device namespace
pub const NS_DEVICE: &[u8] = b"http://ns.google.com/photos/dd/1.0/device/";

/// Dynamic depth container namespace
pub const NS_CONTAINER: &[u8] = b"http://ns.google.com/photos/dd/1.0/container/";

/// Dynamic depth container item namespace
pub const NS_ITEM: &[u8] = b"http://ns.google.com/photos/dd/1.0/item/";

// =============================================================================
// Document model
// =============================================================================

/// One entry of a container directory, as declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryItem {
    pub mime: String,
    pub length: i64,
    pub data_uri: String,
}

/// The fields of one `xmpmeta` document that extraction looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmpDocument {
    pub depth_mime: String,
    pub depth_format: String,
    pub depth_near: f64,
    pub depth_far: f64,
    /// Base64 depth payload
    pub depth_data: String,

    pub image_mime: String,
    /// Base64 image payload
    pub image_data: String,

    /// `rdf:li` entries of the container directory, in document order
    pub items: Vec<DirectoryItem>,
}

/// Documents decoded from a stream, plus what stopped decoding early.
#[derive(Debug, Clone, Default)]
pub struct DecodedDocuments {
    pub documents: Vec<XmpDocument>,

    /// Error that ended decoding, if the stream did not end cleanly
    pub stopped_by: Option<XmpError>,
}

/// Decode every document in `stream`.
///
/// Decoding stops at the first malformed document; documents decoded before
/// it are kept and anything after it is ignored.
pub fn decode_documents(stream: &[u8]) -> DecodedDocuments {
    let mut reader = NsReader::from_reader(stream);
    let mut decoded = DecodedDocuments::default();

    loop {
        match next_document(&mut reader) {
            Ok(Some(document)) => decoded.documents.push(document),
            Ok(None) => break,
            Err(e) => {
                debug!(
                    documents = decoded.documents.len(),
                    error = %e,
                    "XMP decoding stopped"
                );
                decoded.stopped_by = Some(e);
                break;
            }
        }
    }

    decoded
}

// =============================================================================
// Element paths
// =============================================================================

/// Elements that matter on the way from the root to a container item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Rdf,
    Description,
    Container,
    Directory,
    Seq,
    Li,
    Item,
    Other,
}

/// `xmpmeta / RDF / Description / Container / Directory / Seq / li / Item`,
/// without the root.
const ITEM_PATH: [Node; 7] = [
    Node::Rdf,
    Node::Description,
    Node::Container,
    Node::Directory,
    Node::Seq,
    Node::Li,
    Node::Item,
];

fn classify(namespace: Option<&[u8]>, local: &[u8]) -> Node {
    match (namespace, local) {
        (Some(NS_RDF), b"RDF") => Node::Rdf,
        (Some(NS_RDF), b"Description") => Node::Description,
        (Some(NS_DEVICE), b"Container") => Node::Container,
        (Some(NS_CONTAINER), b"Directory") => Node::Directory,
        (Some(NS_RDF), b"Seq") => Node::Seq,
        (Some(NS_RDF), b"li") => Node::Li,
        (Some(NS_CONTAINER), b"Item") => Node::Item,
        _ => Node::Other,
    }
}

fn on_item_path(stack: &[Node]) -> bool {
    stack.len() <= ITEM_PATH.len() && stack == &ITEM_PATH[..stack.len()]
}

// =============================================================================
// Decoding
// =============================================================================

fn malformed(position: u64, err: impl std::fmt::Display) -> XmpError {
    XmpError::Malformed {
        position,
        message: err.to_string(),
    }
}

/// Reject control characters that XML never allows, NUL included.
fn check_chars(raw: &[u8], position: u64) -> Result<(), XmpError> {
    match raw
        .iter()
        .find(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r'))
    {
        Some(&b) => Err(malformed(position, format!("illegal character code U+{:04X}", b))),
        None => Ok(()),
    }
}

fn bound_namespace(resolved: ResolveResult) -> Option<Vec<u8>> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => Some(ns.to_vec()),
        _ => None,
    }
}

/// Skip to the next root element and decode it; `None` at end of stream.
fn next_document(reader: &mut NsReader<&[u8]>) -> Result<Option<XmpDocument>, XmpError> {
    loop {
        let position = reader.buffer_position() as u64;
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| malformed(position, e))?;
        let namespace = bound_namespace(resolved);

        match event {
            Event::Start(root) => {
                check_chars(&root, position)?;
                check_root(namespace.as_deref(), &root, position)?;
                let mut document = XmpDocument::default();
                read_body(reader, &mut document)?;
                return Ok(Some(document));
            }
            Event::Empty(root) => {
                check_chars(&root, position)?;
                check_root(namespace.as_deref(), &root, position)?;
                return Ok(Some(XmpDocument::default()));
            }
            Event::Eof => return Ok(None),
            // Whitespace between documents
            Event::Text(text) => check_chars(&text, position)?,
            // Declarations, processing instructions
            _ => {}
        }
    }
}

fn check_root(namespace: Option<&[u8]>, root: &BytesStart, position: u64) -> Result<(), XmpError> {
    let local = root.local_name();
    if namespace == Some(NS_META) && local.as_ref() == b"xmpmeta" {
        return Ok(());
    }
    Err(XmpError::Malformed {
        position,
        message: format!(
            "expected element <xmpmeta> in {} but have <{}>",
            String::from_utf8_lossy(NS_META),
            String::from_utf8_lossy(local.as_ref())
        ),
    })
}

/// Read the children of the root up to and including its end tag.
fn read_body(reader: &mut NsReader<&[u8]>, document: &mut XmpDocument) -> Result<(), XmpError> {
    let mut stack: Vec<Node> = Vec::new();

    loop {
        let position = reader.buffer_position() as u64;
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| malformed(position, e))?;
        let namespace = bound_namespace(resolved);

        match event {
            Event::Start(element) => {
                check_chars(&element, position)?;
                stack.push(classify(namespace.as_deref(), element.local_name().as_ref()));
                visit(reader, document, &stack, &element, position)?;
            }
            Event::Empty(element) => {
                check_chars(&element, position)?;
                stack.push(classify(namespace.as_deref(), element.local_name().as_ref()));
                visit(reader, document, &stack, &element, position)?;
                stack.pop();
            }
            Event::End(_) => {
                if stack.pop().is_none() {
                    return Ok(());
                }
            }
            Event::Eof => return Err(malformed(position, "unexpected end of XMP stream")),
            Event::Text(text) => check_chars(&text, position)?,
            Event::CData(data) => check_chars(&data, position)?,
            _ => {}
        }
    }
}

/// Apply the attributes of an element that sits on a path of interest.
fn visit(
    reader: &NsReader<&[u8]>,
    document: &mut XmpDocument,
    stack: &[Node],
    element: &BytesStart,
    position: u64,
) -> Result<(), XmpError> {
    if !on_item_path(stack) {
        return Ok(());
    }

    match stack.len() {
        2 => for_each_attribute(reader, element, position, |ns, local, value| {
            apply_description(document, ns, local, value, position)
        }),
        6 => {
            document.items.push(DirectoryItem::default());
            Ok(())
        }
        7 => {
            let Some(item) = document.items.last_mut() else {
                return Ok(());
            };
            for_each_attribute(reader, element, position, |ns, local, value| {
                apply_item(item, ns, local, value, position)
            })
        }
        _ => Ok(()),
    }
}

fn for_each_attribute<F>(
    reader: &NsReader<&[u8]>,
    element: &BytesStart,
    position: u64,
    mut apply: F,
) -> Result<(), XmpError>
where
    F: FnMut(&[u8], &[u8], String) -> Result<(), XmpError>,
{
    for attr in element.attributes() {
        let attr = attr.map_err(|e| malformed(position, e))?;
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let ResolveResult::Bound(Namespace(ns)) = resolved else {
            continue;
        };
        let value = attr.unescape_value().map_err(|e| malformed(position, e))?;
        apply(ns, local.as_ref(), value.into_owned())?;
    }
    Ok(())
}

fn apply_description(
    document: &mut XmpDocument,
    ns: &[u8],
    local: &[u8],
    value: String,
    position: u64,
) -> Result<(), XmpError> {
    match (ns, local) {
        (NS_GDEPTH, b"Mime") => document.depth_mime = value,
        (NS_GDEPTH, b"Format") => document.depth_format = value,
        (NS_GDEPTH, b"Near") => document.depth_near = parse_number(&value, "GDepth:Near", position)?,
        (NS_GDEPTH, b"Far") => document.depth_far = parse_number(&value, "GDepth:Far", position)?,
        (NS_GDEPTH, b"Data") => document.depth_data = value,
        (NS_GIMAGE, b"Mime") => document.image_mime = value,
        (NS_GIMAGE, b"Data") => document.image_data = value,
        _ => {}
    }
    Ok(())
}

fn apply_item(
    item: &mut DirectoryItem,
    ns: &[u8],
    local: &[u8],
    value: String,
    position: u64,
) -> Result<(), XmpError> {
    match (ns, local) {
        (NS_ITEM, b"Mime") => item.mime = value,
        (NS_ITEM, b"Length") => item.length = parse_number(&value, "Item:Length", position)?,
        (NS_ITEM, b"DataURI") => item.data_uri = value,
        _ => {}
    }
    Ok(())
}

/// Parse a numeric attribute; surrounding whitespace is ignored and an empty
/// value is zero.
fn parse_number<T>(value: &str, field: &str, position: u64) -> Result<T, XmpError>
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    trimmed.parse().map_err(|e| XmpError::Malformed {
        position,
        message: format!("invalid {} {:?}: {}", field, value, e),
    })
}

// =============================================================================
// Tests
// =============================================================================
