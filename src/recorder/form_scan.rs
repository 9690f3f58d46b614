use super::locator::{synthesize, LocatorOptions};
use super::statement::{Action, RecordedStatement};
use crate::dom::{DomNode, NodeKind};

/// `type` statements for every text or password input of `form` whose value
/// differs from its markup default, in document order. Other control types are
/// captured elsewhere.
pub fn scan_form_inputs<N: DomNode>(form: &N, options: &LocatorOptions) -> Vec<RecordedStatement> {
    form.descendants()
        .into_iter()
        .filter(|node| node.kind() == NodeKind::Input)
        .filter(|node| matches!(node.control_type().as_deref(), Some("text" | "password")))
        .filter_map(|input| {
            let value = input.value().filter(|v| !v.is_empty())?;
            if input.attribute("value").as_deref() == Some(value.as_str()) {
                return None;
            }
            let locator = synthesize(&input, options);
            Some(RecordedStatement::new(Action::Type, locator.to_string()).with_value(value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomTree, NodeId, NodeSpec};

    #[test]
    fn only_filled_text_and_password_inputs_are_typed() {
        let tree = DomTree::from_spec(
            &NodeSpec::new("form")
                .attr("name", "login")
                .child(NodeSpec::new("input").attr("name", "user").value("alice"))
                .child(
                    NodeSpec::new("input")
                        .attr("type", "PASSWORD")
                        .attr("name", "pass")
                        .value("s3cret"),
                )
                .child(NodeSpec::new("input").attr("name", "empty"))
                .child(
                    NodeSpec::new("input")
                        .attr("type", "checkbox")
                        .attr("name", "remember")
                        .attr("value", "on"),
                )
                .child(
                    NodeSpec::new("input")
                        .attr("type", "hidden")
                        .attr("name", "csrf")
                        .attr("value", "abc"),
                ),
        );
        let form = tree.get(NodeId(1)).unwrap();

        let statements = scan_form_inputs(&form, &LocatorOptions::default());
        let rendered: Vec<_> = statements.iter().map(|s| s.render("@selenium")).collect();
        assert_eq!(
            rendered,
            [
                r#"@selenium.type("//form[@name='login']/input[@name='user']", "alice")"#,
                r#"@selenium.type("//form[@name='login']/input[@name='pass']", "s3cret")"#,
            ]
        );
    }

    #[test]
    fn untouched_default_value_is_not_typed() {
        let tree = DomTree::from_spec(
            &NodeSpec::new("form")
                .child(
                    NodeSpec::new("input")
                        .attr("id", "q")
                        .attr("value", "prefilled"),
                )
                .child(
                    NodeSpec::new("input")
                        .attr("id", "same")
                        .attr("value", "kept")
                        .value("kept"),
                ),
        );
        let statements = scan_form_inputs(&tree.get(NodeId(1)).unwrap(), &LocatorOptions::default());
        assert!(statements.is_empty());
    }

    #[test]
    fn edited_default_value_is_typed() {
        let tree = DomTree::from_spec(
            &NodeSpec::new("form").child(
                NodeSpec::new("input")
                    .attr("id", "q")
                    .attr("value", "prefilled")
                    .value("changed"),
            ),
        );
        let statements = scan_form_inputs(&tree.get(NodeId(1)).unwrap(), &LocatorOptions::default());
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].value(), Some("changed"));
    }
}
