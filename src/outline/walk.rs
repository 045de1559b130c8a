//! Pre-order traversal of a [`Node`] tree yielding outline steps.
//!
//! Only title elements with text produce steps. A title without attributes or
//! children becomes a [`Step::Leaf`]. A title that also has attributes or
//! children cannot be flattened to a single `text:` line, so it yields a
//! [`Step::Annotated`] carrying a copy of its attributes extended with the text
//! under [`AttrKey::NodeContent`]; no line is written for it and its children
//! are visited as usual.

use super::node::Node;

/// Key of an entry in an annotated attribute list.
///
/// Keeping the synthetic key a separate variant means it can never be
/// confused with an attribute read from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKey<'a> {
    Xml(&'a str),
    /// The element's raw text content.
    NodeContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<'a> {
    Leaf {
        depth: usize,
        text: &'a str,
    },
    Annotated {
        depth: usize,
        node: &'a Node,
        attributes: Vec<(AttrKey<'a>, &'a str)>,
    },
}

impl Step<'_> {
    pub fn depth(&self) -> usize {
        match self {
            Step::Leaf { depth, .. } | Step::Annotated { depth, .. } => *depth,
        }
    }
}

/// Attributes of `node` followed by its raw text under [`AttrKey::NodeContent`].
pub fn annotated_attributes(node: &Node) -> Vec<(AttrKey<'_>, &str)> {
    let mut attributes: Vec<_> = node
        .attributes
        .iter()
        .map(|attr| (AttrKey::Xml(attr.name.as_str()), attr.value.as_str()))
        .collect();
    if let Some(text) = node.text.as_deref() {
        attributes.push((AttrKey::NodeContent, text));
    }
    attributes
}

/// Iterator over the outline steps of a tree, driven by an explicit stack.
pub struct Walk<'a> {
    pending: Vec<(&'a Node, usize)>,
}

/// Walk `root`, which sits at depth 0.
pub fn walk(root: &Node) -> Walk<'_> {
    Walk {
        pending: vec![(root, 0)],
    }
}

impl<'a> Walk<'a> {
    fn descend(&mut self, node: &'a Node, depth: usize) {
        self.pending
            .extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Step<'a>;

    fn next(&mut self) -> Option<Step<'a>> {
        while let Some((node, depth)) = self.pending.pop() {
            let content = node.content();
            if content.is_empty() || !node.is_title() {
                self.descend(node, depth);
                continue;
            }

            if node.attributes.is_empty() && node.children.is_empty() {
                return Some(Step::Leaf {
                    depth,
                    text: content,
                });
            }

            self.descend(node, depth);
            return Some(Step::Annotated {
                depth,
                node,
                attributes: annotated_attributes(node),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::node::{Attribute, QName, XMIND_CONTENT_NS};

    fn element(local: &str) -> Node {
        Node::new(QName::new(Some(XMIND_CONTENT_NS), local))
    }

    fn title(text: &str) -> Node {
        let mut node = element("title");
        node.text = Some(text.to_string());
        node
    }

    fn with_children(mut node: Node, children: Vec<Node>) -> Node {
        node.children = children;
        node
    }

    #[test]
    fn leaf_title_under_root() {
        let root = with_children(element("xmap-content"), vec![title("Root Idea")]);
        let steps: Vec<_> = walk(&root).collect();
        assert_eq!(
            steps,
            [Step::Leaf {
                depth: 1,
                text: "Root Idea"
            }]
        );
    }

    #[test]
    fn title_with_children_is_annotated_not_leaf() {
        let parent = with_children(title("Parent"), vec![title("Child")]);
        let root = with_children(element("xmap-content"), vec![parent]);

        let steps: Vec<_> = walk(&root).collect();
        assert_eq!(steps.len(), 2);
        match &steps[0] {
            Step::Annotated {
                depth, attributes, ..
            } => {
                assert_eq!(*depth, 1);
                assert_eq!(attributes, &[(AttrKey::NodeContent, "Parent")]);
            }
            other => panic!("expected annotation, got {other:?}"),
        }
        assert_eq!(
            steps[1],
            Step::Leaf {
                depth: 2,
                text: "Child"
            }
        );
    }

    #[test]
    fn annotation_keeps_raw_text_and_real_attributes() {
        let mut node = title("  Styled \n");
        node.attributes.push(Attribute {
            name: "_xml_node_content".into(),
            value: "real".into(),
        });

        let steps: Vec<_> = walk(&node).collect();
        let Step::Annotated { attributes, .. } = &steps[0] else {
            panic!("expected annotation");
        };
        assert_eq!(
            attributes,
            &[
                (AttrKey::Xml("_xml_node_content"), "real"),
                (AttrKey::NodeContent, "  Styled \n"),
            ]
        );
        // the parsed tree is left untouched
        assert_eq!(node.attributes.len(), 1);
    }

    #[test]
    fn blank_and_foreign_titles_are_silent() {
        let mut foreign = Node::new(QName::new(None, "title"));
        foreign.text = Some("not xmind".into());
        let root = with_children(
            element("sheet"),
            vec![
                title("   "),
                foreign,
                with_children(element("topic"), vec![title("deep")]),
            ],
        );

        let steps: Vec<_> = walk(&root).collect();
        assert_eq!(
            steps,
            [Step::Leaf {
                depth: 2,
                text: "deep"
            }]
        );
    }

    #[test]
    fn pre_order_and_document_order() {
        let root = with_children(
            element("topics"),
            vec![
                with_children(
                    element("topic"),
                    vec![
                        title("a"),
                        with_children(element("topic"), vec![title("a1")]),
                    ],
                ),
                with_children(element("topic"), vec![title("b")]),
            ],
        );

        let texts: Vec<_> = walk(&root)
            .map(|step| match step {
                Step::Leaf { depth, text } => (text, depth),
                Step::Annotated { .. } => unreachable!(),
            })
            .collect();
        assert_eq!(texts, [("a", 2), ("a1", 3), ("b", 2)]);
    }

    #[test]
    fn root_title_is_depth_zero() {
        let root = title("Alone");
        assert_eq!(
            walk(&root).collect::<Vec<_>>(),
            [Step::Leaf {
                depth: 0,
                text: "Alone"
            }]
        );
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let mut node = title("bottom");
        for _ in 0..100_000 {
            node = with_children(element("topic"), vec![node]);
        }
        let steps: Vec<_> = walk(&node).collect();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].depth(), 100_000);
    }
}
