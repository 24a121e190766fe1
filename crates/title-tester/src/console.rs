//! Terminal operator: prompts on stdout, answers from stdin.
//!
//! A single Ctrl-C listener runs on a private one-worker runtime for the
//! whole process. Each prompt races the next stdin line against it, and a
//! Ctrl-C that lands while the parser runs stays pending until the session
//! asks. Either way the session unwinds through its final flush instead of
//! the process being killed.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tracing::{debug, warn};
use tracking::{Operator, OperatorInput, ParsedFields, StatsSnapshot};

pub struct ConsoleOperator {
    runtime: Option<Runtime>,
    lines: Lines<BufReader<Stdin>>,
    interrupted: watch::Receiver<bool>,
}

impl ConsoleOperator {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("Failed to start input runtime")?;

        let (tx, interrupted) = watch::channel(false);
        runtime.spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    debug!("Ctrl-C received");
                    let _ = tx.send(true);
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });

        let lines = {
            let _guard = runtime.enter();
            BufReader::new(tokio::io::stdin()).lines()
        };

        Ok(Self {
            runtime: Some(runtime),
            lines,
            interrupted,
        })
    }
}

impl Operator for ConsoleOperator {
    fn present(&mut self, title: &str, parsed: &ParsedFields) {
        println!();
        println!("{}", "=".repeat(80));
        println!("Title: {title}");
        println!("{}", "-".repeat(80));
        print!("{}", render_fields(parsed));
        println!("{}", "-".repeat(80));
    }

    fn read_line(&mut self, prompt: &str) -> OperatorInput {
        print!("{prompt}");
        let _ = std::io::stdout().flush();

        if self.interrupt_pending() {
            println!();
            return OperatorInput::Interrupted;
        }
        let Some(runtime) = self.runtime.as_ref() else {
            return OperatorInput::Interrupted;
        };
        let lines = &mut self.lines;
        let interrupted = &mut self.interrupted;

        runtime.block_on(async {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => OperatorInput::Line(line),
                    Ok(None) => {
                        debug!("stdin closed");
                        println!();
                        OperatorInput::Interrupted
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read operator input");
                        OperatorInput::Interrupted
                    }
                },
                // A closed channel means no listener; keep waiting on stdin
                Ok(()) = interrupted.changed() => {
                    println!();
                    OperatorInput::Interrupted
                }
            }
        })
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }

    fn show_stats(&mut self, snapshot: &StatsSnapshot) {
        // Nothing to compare against in single-title mode
        if snapshot.has_dataset() {
            println!();
            println!("{snapshot}");
            println!();
        }
    }

    fn interrupt_pending(&mut self) -> bool {
        *self.interrupted.borrow()
    }
}

impl Drop for ConsoleOperator {
    fn drop(&mut self) {
        // A pending stdin read would otherwise block runtime shutdown
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// "Parsed Result:" block, one `  key: value` line per field
pub fn render_fields(parsed: &ParsedFields) -> String {
    let mut out = String::from("Parsed Result:\n");
    for (key, value) in parsed {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out.push_str(&format!("  {key}: {value}\n"));
    }
    out
}
