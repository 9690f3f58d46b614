use std::fs::File;
use std::io::{self, BufWriter, Write};

use colored::Colorize;
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::error::Result;
use crate::host::ReplayHost;
use crate::recorder::Recorder;

pub async fn run(cli: &Cli, input: Option<&str>, output: Option<&str>) -> Result<()> {
    let config = cli.load_config()?;
    let profile = config.get_profile(cli.profile.as_deref())?;

    let output = output.unwrap_or(config.recorder.output.as_str()).to_string();
    let to_stdout = output == "-";
    let sink: Box<dyn Write> = if to_stdout {
        Box::new(io::stdout())
    } else {
        Box::new(File::create(&output)?)
    };

    let reader: Box<dyn AsyncBufRead + Unpin> = match input {
        None | Some("-") => Box::new(BufReader::new(tokio::io::stdin())),
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    tracing::info!("Recording into {}", output);
    let recorder = Recorder::new(
        ReplayHost::new(config.recorder.top_frame.clone()),
        BufWriter::new(sink),
        &config,
        &profile,
    );
    let (summary, _) = recorder.run(reader, cancel).await?;

    // Keep stdout clean when the script itself goes there.
    if cli.json {
        let json = serde_json::to_string_pretty(&summary)?;
        if to_stdout {
            eprintln!("{}", json);
        } else {
            println!("{}", json);
        }
    } else {
        let message = format!(
            "{} Recorded {} statements from {} events{}",
            "✓".green(),
            summary.statements,
            summary.events,
            if summary.duplicates > 0 {
                format!(" ({} marked DUP?)", summary.duplicates)
                    .yellow()
                    .to_string()
            } else {
                String::new()
            }
        );
        if to_stdout {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
            println!("  Script: {}", output.dimmed());
        }
        if summary.skipped_lines > 0 {
            eprintln!(
                "{} Skipped {} unreadable transcript lines",
                "!".yellow(),
                summary.skipped_lines
            );
        }
    }

    Ok(())
}
