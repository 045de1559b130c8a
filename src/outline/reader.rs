//! Builds a [`Node`] tree from XML text.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::error::ParseError;

use super::node::{Attribute, Node, QName};

/// Read and parse a document from disk.
pub async fn read_document(path: &Path) -> Result<Node, ParseError> {
    let bytes = tokio::fs::read(path).await?;
    let source = std::str::from_utf8(&bytes)?;
    parse_document(source)
}

/// Parse XML text into a tree rooted at the document element.
pub fn parse_document(source: &str) -> Result<Node, ParseError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut reader = NsReader::from_str(source);
    let mut open: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|source| ParseError::Xml { position, source })?;

        match event {
            Event::Start(_) | Event::Empty(_) if root.is_some() && open.is_empty() => {
                return Err(ParseError::OutsideRoot(position));
            }
            Event::Start(start) => {
                open.push(element(&reader, &start, position)?);
            }
            Event::Empty(start) => {
                let node = element(&reader, &start, position)?;
                close(node, &mut open, &mut root);
            }
            Event::End(_) => {
                let node = open.pop().ok_or(ParseError::OutsideRoot(position))?;
                close(node, &mut open, &mut root);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|source| ParseError::Xml { position, source })?;
                append_text(&text, &mut open, position)?;
            }
            Event::CData(data) => {
                let data = data.into_inner();
                append_text(std::str::from_utf8(&data)?, &mut open, position)?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(ParseError::Unclosed(unclosed.name.to_string()));
    }
    root.ok_or(ParseError::NoRoot)
}

fn element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<Node, ParseError> {
    let (namespace, local) = reader.resolve_element(start.name());
    let mut node = Node::new(QName::new(
        namespace_of(namespace, position)?.as_deref(),
        std::str::from_utf8(local.as_ref())?,
    ));

    for attr in start.attributes() {
        let attr = attr.map_err(|err| ParseError::Xml {
            position,
            source: err.into(),
        })?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }

        let (namespace, local) = reader.resolve_attribute(attr.key);
        let name = QName::new(
            namespace_of(namespace, position)?.as_deref(),
            std::str::from_utf8(local.as_ref())?,
        );
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|source| ParseError::Xml { position, source })?;

        node.attributes.push(Attribute {
            name: name.to_string(),
            value: value.into_owned(),
        });
    }

    Ok(node)
}

fn namespace_of(
    resolved: ResolveResult<'_>,
    position: u64,
) -> Result<Option<String>, ParseError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(std::str::from_utf8(ns.as_ref())?.to_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(ParseError::UnboundPrefix {
            prefix: String::from_utf8_lossy(&prefix).into_owned(),
            position,
        }),
    }
}

/// Character data only counts as a node's text until its first child opens.
fn append_text(text: &str, open: &mut [Node], position: u64) -> Result<(), ParseError> {
    match open.last_mut() {
        Some(node) if node.children.is_empty() => {
            node.text.get_or_insert_with(String::new).push_str(text);
            Ok(())
        }
        Some(_) => Ok(()),
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::OutsideRoot(position)),
    }
}

fn close(node: Node, open: &mut [Node], root: &mut Option<Node>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::node::XMIND_CONTENT_NS;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<xmap-content xmlns="urn:xmind:xmap:xmlns:content:2.0" xmlns:svg="http://www.w3.org/2000/svg" version="2.0">
  <sheet id="s1">
    <topic id="t1">
      <title>Central &amp; Topic</title>
      <children>
        <topics type="attached">
          <topic id="t2"><title svg:width="300">Wide</title></topic>
          <topic id="t3"><title><![CDATA[<raw>]]></title></topic>
        </topics>
      </children>
    </topic>
  </sheet>
</xmap-content>"#;

    #[test]
    fn builds_namespaced_tree() {
        let root = parse_document(DOC).unwrap();
        assert_eq!(root.name, QName::new(Some(XMIND_CONTENT_NS), "xmap-content"));
        assert_eq!(root.attribute("version"), Some("2.0"));
        // namespace declarations are not attributes
        assert_eq!(root.attributes.len(), 1);

        let topic = &root.children[0].children[0];
        assert_eq!(topic.attribute("id"), Some("t1"));
        let title = &topic.children[0];
        assert!(title.is_title());
        assert_eq!(title.content(), "Central & Topic");
        assert_eq!(root.subtree_size(), 10);
    }

    #[test]
    fn namespaced_attributes_use_clark_notation() {
        let root = parse_document(DOC).unwrap();
        let topics = &root.children[0].children[0].children[1].children[0];
        let wide = &topics.children[0].children[0];
        assert_eq!(
            wide.attribute("{http://www.w3.org/2000/svg}width"),
            Some("300")
        );
        let raw = &topics.children[1].children[0];
        assert_eq!(raw.content(), "<raw>");
    }

    #[test]
    fn text_stops_at_first_child() {
        let root = parse_document("<a> head <b>inner</b> tail </a>").unwrap();
        assert_eq!(root.text.as_deref(), Some(" head "));
        assert_eq!(root.children[0].content(), "inner");
    }

    #[test]
    fn children_keep_document_order() {
        let root = parse_document("<a><b/><c/><d/></a>").unwrap();
        let names: Vec<_> = root.children.iter().map(|c| c.name.local.as_str()).collect();
        assert_eq!(names, ["b", "c", "d"]);
    }

    #[test]
    fn unprefixed_attributes_have_no_namespace() {
        let root = parse_document(r#"<a xmlns="urn:x" k="v"/>"#).unwrap();
        assert_eq!(root.name.namespace.as_deref(), Some("urn:x"));
        assert_eq!(root.attribute("k"), Some("v"));
    }

    #[test]
    fn empty_document_has_no_root() {
        assert!(matches!(parse_document(""), Err(ParseError::NoRoot)));
        assert!(matches!(
            parse_document("<?xml version=\"1.0\"?>\n"),
            Err(ParseError::NoRoot)
        ));
    }

    #[test]
    fn rejects_mismatched_end_tag() {
        assert!(parse_document("<a><b></a></b>").is_err());
    }

    #[test]
    fn rejects_unclosed_element() {
        assert!(parse_document("<a><b>").is_err());
    }

    #[test]
    fn rejects_second_root() {
        assert!(matches!(
            parse_document("<a/><b/>"),
            Err(ParseError::OutsideRoot(_))
        ));
    }

    #[test]
    fn rejects_text_outside_root() {
        assert!(matches!(
            parse_document("<a/>junk"),
            Err(ParseError::OutsideRoot(_))
        ));
    }

    #[test]
    fn rejects_unbound_prefix() {
        assert!(matches!(
            parse_document("<x:a/>"),
            Err(ParseError::UnboundPrefix { prefix, .. }) if prefix == "x"
        ));
    }

    #[test]
    fn rejects_duplicate_attributes() {
        assert!(parse_document(r#"<a k="1" k="2"/>"#).is_err());
    }

    #[test]
    fn parsing_is_repeatable() {
        assert_eq!(parse_document(DOC).unwrap(), parse_document(DOC).unwrap());
    }

    #[tokio::test]
    async fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.xml");
        std::fs::write(&path, "\u{feff}<a>x</a>").unwrap();

        let root = read_document(&path).await.unwrap();
        assert_eq!(root.content(), "x");
    }

    #[tokio::test]
    async fn missing_document_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("content.xml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
