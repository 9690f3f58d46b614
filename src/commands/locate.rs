use std::path::Path;

use colored::Colorize;

use crate::cli::Cli;
use crate::dom::{DomNode, DomTree, NodeId};
use crate::error::{RecorderError, Result};
use crate::recorder::{synthesize, LocatorOptions};

pub async fn run(cli: &Cli, dom: &Path, node: usize) -> Result<()> {
    let config = cli.load_config()?;
    let profile = config.get_profile(cli.profile.as_deref())?;

    let json = tokio::fs::read_to_string(dom).await?;
    let tree = DomTree::from_json(&json)?;
    let target = tree.get(NodeId(node)).ok_or_else(|| {
        RecorderError::Other(format!(
            "Node {} not found ({} nodes in {})",
            NodeId(node),
            tree.len(),
            dom.display()
        ))
    })?;

    let locator = synthesize(&target, &LocatorOptions::from(&profile));
    tracing::debug!("Located {} as {}", NodeId(node), locator);

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "node": node,
                "tag": target.tag_name(),
                "locator": locator.to_string()
            })
        );
    } else if locator.is_empty() {
        println!("{}", "(document root has no locator)".dimmed());
    } else {
        println!("{}", locator);
    }

    Ok(())
}
