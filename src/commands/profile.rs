use colored::Colorize;

use crate::cli::{Cli, ProfileCommands};
use crate::error::Result;

pub async fn run(cli: &Cli, command: &ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::List => list(cli).await,
        ProfileCommands::Show { name } => show(cli, name).await,
    }
}

async fn list(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let default_name = config.effective_default_profile_name();

    let mut names: Vec<&String> = config.profiles.keys().collect();
    names.sort();

    if cli.json {
        let profiles: Vec<_> = names
            .iter()
            .map(|name| {
                let profile = &config.profiles[*name];
                serde_json::json!({
                    "name": name,
                    "max_depth": profile.max_depth,
                    "stop_at_id": profile.stop_at_id,
                    "default": **name == default_name
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&profiles)?);
    } else {
        println!("{}", "Profiles:".bold());
        println!();

        for name in names {
            let profile = &config.profiles[name];
            let default_marker = if *name == default_name {
                " (default)".dimmed()
            } else {
                "".into()
            };

            println!("  {} {}{}", "●".cyan(), name.bold(), default_marker);
            println!("    Max depth: {}", profile.max_depth);
            if profile.stop_at_id {
                println!("    Stops at: {}", "@id".dimmed());
            }
            println!();
        }

        // The default may name a built-in that the config file dropped.
        if !config.profiles.contains_key(&default_name) {
            if let Ok(profile) = config.get_profile(Some(&default_name)) {
                println!("  {} {} (implicit)", "●".cyan(), default_name.bold());
                println!("    Max depth: {}", profile.max_depth);
                println!();
            }
        }
    }

    Ok(())
}

async fn show(cli: &Cli, name: &str) -> Result<()> {
    let config = cli.load_config()?;
    let profile = config.get_profile(Some(name))?;

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "name": name,
                "max_depth": profile.max_depth,
                "stop_at_id": profile.stop_at_id
            })
        );
    } else {
        println!("{} {}", "Profile:".bold(), name.cyan());
        println!();
        println!("  Max depth: {}", profile.max_depth);
        println!("  Stop at id: {}", profile.stop_at_id);
    }

    Ok(())
}
