use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DomNode, NodeId, NodeKind};

const DOCUMENT_TAG: &str = "#document";

/// Serialized form of an element subtree, as it appears in transcripts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub tag: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,

    /// Live value of a form control, when it differs from the markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    value: Option<String>,
    checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed snapshot of one document.
///
/// Node ids are assigned in pre-order; id 0 is always the document root.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Build a tree from a spec. A spec whose tag is not `#document` is wrapped
    /// in a synthetic document node.
    pub fn from_spec(spec: &NodeSpec) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        if spec.tag == DOCUMENT_TAG {
            tree.insert(spec, None);
        } else {
            let document = tree.push(&NodeSpec::new(DOCUMENT_TAG), None);
            let child = tree.insert(spec, Some(document));
            tree.nodes[document.0].children.push(child);
        }
        tree
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let spec: NodeSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(&spec))
    }

    fn push(&mut self, spec: &NodeSpec, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: spec.tag.to_ascii_lowercase(),
            attrs: spec.attrs.clone(),
            value: spec.value.clone(),
            checked: spec.checked || spec.attrs.contains_key("checked"),
            parent,
            children: Vec::new(),
        });
        id
    }

    fn insert(&mut self, spec: &NodeSpec, parent: Option<NodeId>) -> NodeId {
        let id = self.push(spec, parent);
        for child in &spec.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: NodeId(0),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node of the given kind, in document order.
    pub fn find_all(&self, kind: NodeKind) -> Vec<NodeRef<'_>> {
        (0..self.nodes.len())
            .map(|i| NodeRef {
                tree: self,
                id: NodeId(i),
            })
            .filter(|node| node.kind() == kind)
            .collect()
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

/// Borrowed handle into a [`DomTree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a Node {
        self.tree.node(self.id)
    }

    fn selected_option_value(&self) -> Option<String> {
        let options: Vec<_> = self
            .descendants()
            .into_iter()
            .filter(|n| n.data().tag == "option")
            .collect();
        options
            .iter()
            .find(|o| o.data().attrs.contains_key("selected"))
            .or_else(|| options.first())
            .and_then(|o| o.attribute("value"))
    }
}

impl<'a> DomNode for NodeRef<'a> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::from_tag(&self.data().tag)
    }

    fn tag_name(&self) -> Option<String> {
        let tag = &self.data().tag;
        (!tag.is_empty() && tag != DOCUMENT_TAG).then(|| tag.clone())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.data().attrs.get(name).cloned()
    }

    fn value(&self) -> Option<String> {
        let node = self.data();
        node.value
            .clone()
            .or_else(|| match node.tag.as_str() {
                "select" => self.selected_option_value(),
                _ => node.attrs.get("value").cloned(),
            })
    }

    fn checked(&self) -> bool {
        self.data().checked
    }

    fn sibling_index(&self) -> Option<usize> {
        let parent = self.data().parent?;
        let tag = &self.data().tag;
        self.tree
            .node(parent)
            .children
            .iter()
            .filter(|id| &self.tree.node(**id).tag == tag)
            .position(|id| *id == self.id)
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    fn descendants(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.data().children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(NodeRef {
                tree: self.tree,
                id,
            });
            stack.extend(self.tree.node(id).children.iter().rev().copied());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DomTree {
        DomTree::from_spec(
            &NodeSpec::new("html").child(
                NodeSpec::new("body")
                    .child(NodeSpec::new("p"))
                    .child(
                        NodeSpec::new("ul")
                            .child(NodeSpec::new("li"))
                            .child(NodeSpec::new("li").attr("class", "second")),
                    )
                    .child(
                        NodeSpec::new("select").attr("name", "size").child(
                            NodeSpec::new("option").attr("value", "s"),
                        ).child(
                            NodeSpec::new("option").attr("value", "m").attr("selected", ""),
                        ),
                    ),
            ),
        )
    }

    #[test]
    fn ids_are_assigned_in_pre_order() {
        let tree = sample();
        assert_eq!(tree.root().kind(), NodeKind::DocumentRoot);
        assert_eq!(tree.get(NodeId(1)).unwrap().tag_name().as_deref(), Some("html"));
        assert_eq!(tree.get(NodeId(3)).unwrap().tag_name().as_deref(), Some("p"));
        assert_eq!(tree.get(NodeId(6)).unwrap().attribute("class").as_deref(), Some("second"));
        assert!(tree.get(NodeId(tree.len())).is_none());
    }

    #[test]
    fn sibling_index_counts_same_tag_only() {
        let tree = sample();
        let second_li = tree.get(NodeId(6)).unwrap();
        assert_eq!(second_li.sibling_index(), Some(1));
        assert!(tree.root().sibling_index().is_none());
    }

    #[test]
    fn descendants_are_in_document_order() {
        let tree = sample();
        let tags: Vec<_> = tree
            .root()
            .descendants()
            .iter()
            .filter_map(|n| n.tag_name())
            .collect();
        assert_eq!(
            tags,
            ["html", "body", "p", "ul", "li", "li", "select", "option", "option"]
        );
    }

    #[test]
    fn select_value_follows_selected_option() {
        let tree = sample();
        let select = tree.find_all(NodeKind::GenericContainer)
            .into_iter()
            .find(|n| n.tag_name().as_deref() == Some("select"))
            .unwrap();
        assert_eq!(select.value().as_deref(), Some("m"));
    }

    #[test]
    fn parses_json_spec() {
        let tree = DomTree::from_json(
            r#"{"tag":"html","children":[{"tag":"INPUT","attrs":{"type":"checkbox","checked":""}}]}"#,
        )
        .unwrap();
        let input = tree.get(NodeId(2)).unwrap();
        assert_eq!(input.kind(), NodeKind::Input);
        assert!(input.checked());
        assert_eq!(input.control_type().as_deref(), Some("checkbox"));
    }
}
