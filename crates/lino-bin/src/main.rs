//! lino demo REPL.
//!
//! Reads lines with full editing, echoes them back, and wires up a small
//! dictionary completer so rotation and list modes can be exercised. Logging
//! goes to a file (never the terminal the session owns) and only when
//! `LINO_LOG` names a directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use lino::{CompletionMode, Completions, Editor, ReadError};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "lino", version, about = "lino line editor demo")]
struct Args {
    /// History file to load on start and save on exit.
    #[arg(long)]
    history: Option<PathBuf>,
    /// List-mode completion (common prefix + grid) instead of rotation.
    #[arg(long = "list-mode")]
    list_mode: bool,
    /// Print decoded key codes until Ctrl-C, then exit.
    #[arg(long)]
    keycodes: bool,
}

fn init_logging() -> Option<WorkerGuard> {
    let dir = std::env::var_os("LINO_LOG")?;
    let appender = tracing_appender::rolling::never(dir, "lino.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

/// Completes a handful of demo commands; argument words complete as fake
/// paths so the display filter has something to shorten.
fn demo_completer(line: &str, start: usize, end: usize, out: &mut Completions) {
    let word: String = line.chars().take(end).skip(start).collect();
    if start == 0 {
        for cmd in ["hello", "hello there", "help", "history", "quit"] {
            if cmd.starts_with(&word) {
                out.add(cmd);
            }
        }
    } else {
        for path in ["demo/alpha.txt", "demo/beta.txt", "notes/gamma.md"] {
            if path.starts_with(&word) {
                out.add(path);
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging();

    let mut editor = Editor::new();
    if args.keycodes {
        editor.print_key_codes()?;
        return Ok(());
    }

    if args.list_mode {
        editor.set_completion_mode(CompletionMode::List);
    }
    editor.set_completer(demo_completer);
    editor.set_display_filter(|candidate: &str| {
        candidate
            .rsplit_once('/')
            .map(|(_, base)| base.to_string())
    });

    if let Some(path) = &args.history {
        editor.history_load(path)?;
        info!(entries = editor.history().len(), "history loaded");
    }

    loop {
        match editor.readline("lino> ") {
            Ok(line) => {
                if line == "quit" {
                    break;
                }
                if !line.is_empty() {
                    editor.history_add(&line);
                }
                println!("echo: {line}");
            }
            Err(ReadError::Interrupted) => continue,
            Err(ReadError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(path) = &args.history {
        editor.history_save(path)?;
    }
    Ok(())
}
