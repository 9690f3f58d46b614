use std::io::Write;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use super::emitter::StatementEmitter;
use super::envelope::ScriptEnvelope;
use super::event::{parse_line, TranscriptLine};
use super::router::{EventRouter, RouterOptions};
use super::session::RouterState;
use crate::config::{Config, LocatorProfile};
use crate::error::Result;
use crate::host::Host;

/// What a finished recording produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordingSummary {
    pub events: usize,
    pub statements: usize,
    pub duplicates: usize,
    pub skipped_lines: usize,
    pub interrupted: bool,
}

/// Drives the event loop: transcript lines in, script out.
pub struct Recorder<H: Host, W: Write> {
    router: EventRouter<H, W>,
    envelope: ScriptEnvelope,
    events: usize,
    skipped_lines: usize,
    interrupted: bool,
}

impl<H: Host, W: Write> Recorder<H, W> {
    pub fn new(host: H, sink: W, config: &Config, profile: &LocatorProfile) -> Self {
        let emitter = StatementEmitter::new(
            sink,
            config.recorder.receiver.clone(),
            config.recorder.statement_indent,
        );
        let router = EventRouter::new(host, emitter, RouterOptions::from_config(config, profile));
        let envelope = ScriptEnvelope::new(config.envelope.clone(), config.recorder.receiver.clone())
            .with_test_case_index(router.session().test_case_index);

        Self {
            router,
            envelope,
            events: 0,
            skipped_lines: 0,
            interrupted: false,
        }
    }

    pub fn router(&self) -> &EventRouter<H, W> {
        &self.router
    }

    /// Record until the transcript ends, `Quit` arrives or `cancel` fires.
    ///
    /// The footer is written and the sink flushed in all three cases. A fatal
    /// host error flushes what was written so far and is returned as is.
    pub async fn run<R>(mut self, reader: R, cancel: CancellationToken) -> Result<(RecordingSummary, W)>
    where
        R: AsyncBufRead + Unpin,
    {
        let header = self.envelope.header();
        self.router.emitter_mut().write_raw(&header)?;

        if let Err(e) = self.pump(reader, &cancel).await {
            tracing::error!("Recording aborted: {}", e);
            if let Err(flush_err) = self.router.emitter_mut().flush() {
                tracing::warn!("Flush after abort failed: {}", flush_err);
            }
            return Err(e);
        }

        let footer = self.envelope.footer();
        let emitter = self.router.emitter_mut();
        emitter.write_raw(&footer)?;
        emitter.flush()?;

        let summary = RecordingSummary {
            events: self.events,
            statements: emitter.emitted(),
            duplicates: emitter.duplicates(),
            skipped_lines: self.skipped_lines,
            interrupted: self.interrupted,
        };
        tracing::info!(
            "Recorded {} statements from {} events",
            summary.statements,
            summary.events
        );
        Ok((summary, self.router.into_emitter().into_inner()))
    }

    async fn pump<R>(&mut self, reader: R, cancel: &CancellationToken) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut line_no = 0;

        loop {
            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Interrupted, closing script");
                    self.interrupted = true;
                    self.router.terminate();
                    return Ok(());
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                tracing::debug!("Transcript ended after {} lines", line_no);
                return Ok(());
            };
            line_no += 1;

            match parse_line(line_no, &line) {
                Ok(None) => {}
                Ok(Some(TranscriptLine::Dom(update))) => self.router.host_mut().apply_update(update),
                Ok(Some(TranscriptLine::Unhandled(name))) => {
                    tracing::debug!("No handler for {}", name);
                }
                Ok(Some(TranscriptLine::Event(event))) => {
                    self.events += 1;
                    if self.router.dispatch(&event)? == RouterState::Terminated {
                        return Ok(());
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping line: {}", e);
                    self.skipped_lines += 1;
                }
            }
        }
    }
}
