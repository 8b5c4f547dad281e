//! Interactive browsing context
//!
//! Renders the lockdown interstitial and countdown in the terminal, reads
//! navigation and unlock commands from stdin, and serves the context socket
//! so `mindful status` and settings edits can reach it.

use anyhow::{bail, Result};
use mindful_core::{
    config::open_database,
    format_clock,
    ipc::{listen, ContextIpcHandler},
    session::{parse_unlock_minutes, MIN_INTENT_LENGTH},
    IpcRequest, IpcResponse, PresentError, Presenter, SessionRuntime, WarningMessage,
};
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::helpers::{format_snapshot, resolve_socket};

const RULE: &str = "========================================";

/// Presenter that draws on a terminal (or any writer).
pub struct TerminalPresenter<W: Write + Send> {
    out: W,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn show_lockdown(&mut self, message: &WarningMessage) -> Result<(), PresentError> {
        writeln!(self.out, "\n{RULE}")?;
        writeln!(self.out, "  SYSTEM LOCKDOWN")?;
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out, "  {}", message.heading)?;
        writeln!(self.out, "  {}\n", message.headline)?;
        writeln!(self.out, "  {}\n", message.body)?;
        writeln!(self.out, "  The Exit Strategy: {}\n", message.exit_strategy)?;
        writeln!(self.out, "  [close]                      close tab")?;
        writeln!(self.out, "  [unlock <minutes> <intent>]  use with intent")?;
        writeln!(
            self.out,
            "  Min {MIN_INTENT_LENGTH} characters required to unlock"
        )?;
        writeln!(self.out, "{RULE}")?;
        self.out.flush()?;
        Ok(())
    }

    fn hide_lockdown(&mut self) -> Result<(), PresentError> {
        writeln!(self.out, "[lockdown lifted]")?;
        self.out.flush()?;
        Ok(())
    }

    fn show_countdown(&mut self, intent: &str, remaining_seconds: u64) -> Result<(), PresentError> {
        writeln!(self.out, "Intent: {intent}")?;
        write!(self.out, "\rTime: {}", format_clock(remaining_seconds))?;
        self.out.flush()?;
        Ok(())
    }

    fn update_countdown(&mut self, remaining_seconds: u64) -> Result<(), PresentError> {
        write!(self.out, "\rTime: {}", format_clock(remaining_seconds))?;
        self.out.flush()?;
        Ok(())
    }

    fn hide_countdown(&mut self) -> Result<(), PresentError> {
        writeln!(self.out, "\r[time is up]")?;
        self.out.flush()?;
        Ok(())
    }

    fn close_context(&mut self) -> Result<(), PresentError> {
        writeln!(self.out, "Tab closed.")?;
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BrowseCommand {
    Open(String),
    Unlock {
        minutes: Option<i64>,
        intent: String,
    },
    Close,
    State,
    Quit,
}

/// Parse one stdin line. Blank lines yield `None`.
///
/// `unlock` takes an optional leading minute count; without one the whole
/// remainder is the intent and the grant length falls back to the default.
fn parse_command(line: &str) -> Result<Option<BrowseCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match verb {
        "open" => {
            if rest.is_empty() {
                bail!("Usage: open <host>");
            }
            BrowseCommand::Open(rest.to_lowercase())
        }
        "unlock" => {
            let (first, remainder) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            match parse_unlock_minutes(first) {
                Some(minutes) => BrowseCommand::Unlock {
                    minutes: Some(minutes),
                    intent: remainder.trim().to_string(),
                },
                None => BrowseCommand::Unlock {
                    minutes: None,
                    intent: rest.to_string(),
                },
            }
        }
        "close" => BrowseCommand::Close,
        "state" => BrowseCommand::State,
        "quit" | "exit" => BrowseCommand::Quit,
        other => bail!("Unknown command: {other}"),
    };
    Ok(Some(command))
}

fn print_help() {
    println!("Commands:");
    println!("  open <host>                  navigate to a host");
    println!("  unlock <minutes> <intent>    unlock with an intent");
    println!("  close                        close this tab");
    println!("  state                        show the timer");
    println!("  quit                         leave without closing");
}

/// Run a browsing context until the tab is closed or the user quits.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or stdin fails.
pub async fn browse_command(host: Option<String>, socket: Option<PathBuf>) -> Result<()> {
    let db = Arc::new(open_database()?);
    let sock_path = resolve_socket(socket)?;

    let runtime = SessionRuntime::new(TerminalPresenter::stdout(), db);
    let handle = runtime.handle();
    let mut runtime_task = tokio::spawn(runtime.run());

    let handler = Arc::new(ContextIpcHandler::new(handle.clone()));
    let listen_path = sock_path.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = listen(handler, &listen_path).await {
            log::error!("Context socket failed: {e}");
        }
    });

    print_help();
    if let Some(host) = host {
        println!("> open {host}");
        handle.navigate(host.to_lowercase())?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let finished = loop {
        tokio::select! {
            joined = &mut runtime_task => break Some(joined),
            line = lines.next_line() => {
                let Some(line) = line? else {
                    handle.shutdown()?;
                    break None;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(BrowseCommand::Open(host))) => handle.navigate(host)?,
                    Ok(Some(BrowseCommand::Unlock { minutes, intent })) => {
                        if intent.chars().count() < MIN_INTENT_LENGTH {
                            println!("Min {MIN_INTENT_LENGTH} characters required to unlock");
                        }
                        handle.request_unlock(intent, minutes)?;
                    }
                    Ok(Some(BrowseCommand::Close)) => handle.close_tab()?,
                    Ok(Some(BrowseCommand::State)) => {
                        if let IpcResponse::TimerState(snapshot) =
                            handle.request(IpcRequest::GetTimerState).await?
                        {
                            println!("{}", format_snapshot(&snapshot));
                        }
                    }
                    Ok(Some(BrowseCommand::Quit)) => {
                        handle.shutdown()?;
                        break None;
                    }
                    Err(e) => println!("{e}"),
                }
            }
        }
    };

    let joined = match finished {
        Some(joined) => joined,
        None => runtime_task.await,
    };
    server.abort();
    if let Err(e) = fs::remove_file(&sock_path) {
        log::debug!("Socket cleanup skipped: {e}");
    }

    joined?
}
