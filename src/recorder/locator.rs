//! Derives an XPath-style locator from a live DOM node.
//!
//! The walk goes from the target up through its ancestors, choosing one path
//! segment per level. Attribute-based segments win over positional ones:
//! `id` over `name`, `name` over an anchor's `href`, `href` over a row, cell
//! or list position. Anything outside [`NodeKind`]'s enumerated set falls back
//! to its bare tag (or `*` when no tag is available).

use std::fmt;

use crate::config::LocatorProfile;
use crate::dom::{DomNode, NodeKind};

/// Walk options, usually taken from a [`LocatorProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Maximum number of segments; the walk always terminates after this many.
    pub max_depth: usize,
    /// End the walk after the first `@id` segment.
    pub stop_at_id: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            stop_at_id: false,
        }
    }
}

impl From<&LocatorProfile> for LocatorOptions {
    fn from(profile: &LocatorProfile) -> Self {
        Self {
            max_depth: profile.max_depth.max(1),
            stop_at_id: profile.stop_at_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `tag`
    Tag(String),
    /// `tag[@attr='value']`
    Attribute {
        tag: String,
        attr: &'static str,
        value: String,
    },
    /// `tag[n]`, 1-based
    Position { tag: String, index: usize },
    /// `*`
    Wildcard,
}

impl Segment {
    fn is_id(&self) -> bool {
        matches!(self, Segment::Attribute { attr: "id", .. })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Tag(tag) => f.write_str(tag),
            Segment::Attribute { tag, attr, value } => {
                write!(f, "{}[@{}={}]", tag, attr, xpath_literal(value))
            }
            Segment::Position { tag, index } => write!(f, "{}[{}]", tag, index),
            Segment::Wildcard => f.write_str("*"),
        }
    }
}

/// Root-to-leaf path of segments, rendered as `//a/b/c`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locator {
    segments: Vec<Segment>,
}

impl Locator {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("//")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Build the locator for `node`.
pub fn synthesize<N: DomNode>(node: &N, options: &LocatorOptions) -> Locator {
    let mut segments = Vec::new();
    let mut next = Some(node.clone());

    for _ in 0..options.max_depth {
        let Some(current) = next.take() else {
            break;
        };
        if current.kind() == NodeKind::DocumentRoot {
            break;
        }

        let segment = segment_for(&current);
        let anchored = options.stop_at_id && segment.is_id();
        segments.push(segment);
        if anchored {
            break;
        }
        next = current.parent();
    }

    segments.reverse();
    Locator { segments }
}

fn segment_for<N: DomNode>(node: &N) -> Segment {
    let kind = node.kind();
    if kind == NodeKind::Unrecognized {
        let tag = node.tag_name();
        tracing::debug!(
            "Unhandled node kind <{}> ({}), using bare tag",
            tag.as_deref().unwrap_or("?"),
            node.id()
        );
        return tag.map(Segment::Tag).unwrap_or(Segment::Wildcard);
    }

    let Some(tag) = kind
        .canonical_tag()
        .map(str::to_string)
        .or_else(|| node.tag_name())
    else {
        return Segment::Wildcard;
    };

    if let Some(id) = node.non_empty_attribute("id") {
        return Segment::Attribute {
            tag,
            attr: "id",
            value: id,
        };
    }
    if let Some(name) = node.non_empty_attribute("name") {
        return Segment::Attribute {
            tag,
            attr: "name",
            value: name,
        };
    }
    if kind == NodeKind::Anchor {
        if let Some(href) = node.non_empty_attribute("href") {
            return Segment::Attribute {
                tag,
                attr: "href",
                value: href,
            };
        }
    }
    if matches!(
        kind,
        NodeKind::TableRow | NodeKind::TableCell | NodeKind::ListItem
    ) {
        if let Some(index) = node.sibling_index() {
            return Segment::Position {
                tag,
                index: index + 1,
            };
        }
    }

    Segment::Tag(tag)
}

/// Quote a value as an XPath string literal.
///
/// XPath 1.0 has no escapes, so a value holding both quote kinds is split
/// into a `concat()` of literals.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomTree, NodeId, NodeSpec};

    fn page() -> DomTree {
        // 0 #document
        // 1 html
        // 2   body
        // 3     div#main
        // 4       table
        // 5         tbody
        // 6           tr
        // 7             td
        // 8           tr
        // 9             td
        // 10            td
        // 11            td
        // 12              a[href=/edit]
        // 13    ul
        // 14      li
        // 15      li
        // 16        span
        // 17    input#user[name=login]
        // 18    marquee
        DomTree::from_spec(
            &NodeSpec::new("html").child(
                NodeSpec::new("body")
                    .child(
                        NodeSpec::new("div").attr("id", "main").child(
                            NodeSpec::new("table").child(
                                NodeSpec::new("tbody")
                                    .child(NodeSpec::new("tr").child(NodeSpec::new("td")))
                                    .child(
                                        NodeSpec::new("tr")
                                            .child(NodeSpec::new("td"))
                                            .child(NodeSpec::new("td"))
                                            .child(
                                                NodeSpec::new("td").child(
                                                    NodeSpec::new("a").attr("href", "/edit"),
                                                ),
                                            ),
                                    ),
                            ),
                        ),
                    )
                    .child(
                        NodeSpec::new("ul")
                            .child(NodeSpec::new("li"))
                            .child(NodeSpec::new("li").child(NodeSpec::new("span"))),
                    )
                    .child(
                        NodeSpec::new("input")
                            .attr("id", "user")
                            .attr("name", "login"),
                    )
                    .child(NodeSpec::new("marquee")),
            ),
        )
    }

    fn locate(tree: &DomTree, id: usize, options: &LocatorOptions) -> String {
        synthesize(&tree.get(NodeId(id)).unwrap(), options).to_string()
    }

    #[test]
    fn positional_segments_are_one_based() {
        let tree = page();
        assert_eq!(
            locate(&tree, 11, &LocatorOptions::default()),
            "//html/body/div[@id='main']/table/tbody/tr[2]/td[3]"
        );
        assert_eq!(
            locate(&tree, 16, &LocatorOptions::default()),
            "//html/body/ul/li[2]/span"
        );
    }

    #[test]
    fn id_wins_over_name() {
        let tree = page();
        let locator = locate(&tree, 17, &LocatorOptions::default());
        assert_eq!(locator, "//html/body/input[@id='user']");
        assert!(!locator.contains("@name"));
    }

    #[test]
    fn anchors_use_href() {
        let tree = page();
        assert!(locate(&tree, 12, &LocatorOptions::default()).ends_with("/td[3]/a[@href='/edit']"));
    }

    #[test]
    fn synthesis_is_deterministic() {
        let tree = page();
        let node = tree.get(NodeId(12)).unwrap();
        let first = synthesize(&node, &LocatorOptions::default()).to_string();
        let second = synthesize(&node, &LocatorOptions::default()).to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn depth_budget_bounds_the_walk() {
        let tree = page();
        let options = LocatorOptions {
            max_depth: 4,
            stop_at_id: false,
        };
        let locator = synthesize(&tree.get(NodeId(12)).unwrap(), &options);
        assert_eq!(locator.segments().len(), 4);
        assert_eq!(locator.to_string(), "//tbody/tr[2]/td[3]/a[@href='/edit']");
    }

    #[test]
    fn stop_at_id_anchors_on_the_nearest_id() {
        let tree = page();
        let options = LocatorOptions {
            max_depth: 10,
            stop_at_id: true,
        };
        assert_eq!(
            locate(&tree, 9, &options),
            "//div[@id='main']/table/tbody/tr[2]/td[1]"
        );
    }

    #[test]
    fn unrecognized_kinds_fall_back_to_tag_or_wildcard() {
        let tree = page();
        assert_eq!(
            locate(&tree, 18, &LocatorOptions::default()),
            "//html/body/marquee"
        );

        let tree = DomTree::from_spec(&NodeSpec::new("div").child(NodeSpec::new("").attr("id", "x")));
        assert_eq!(locate(&tree, 2, &LocatorOptions::default()), "//div/*");
    }

    #[test]
    fn document_root_yields_empty_locator() {
        let tree = page();
        assert!(synthesize(&tree.root(), &LocatorOptions::default()).is_empty());
    }

    #[test]
    fn literals_pick_a_safe_quote() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal("say \"it's\""),
            "concat('say \"it', \"'\", 's\"')"
        );
    }
}
