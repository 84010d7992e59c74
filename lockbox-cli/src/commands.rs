//! Interactive command dispatcher.
//!
//! Each textual command maps to one protocol client call; `username` and
//! `passcode` add the fixed follow-up read after a short settle delay so the
//! operator sees the peripheral's reaction. Errors are printed, never
//! retried.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use lockbox_client::{LockboxClient, Transport};

/// How long the peripheral gets to process a write before the follow-up read.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Username(String),
    Passcode(String),
    Status,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some("username"), Some(name)) => Ok(Command::Username(name.to_string())),
            (Some("username"), None) => Err("usage: username <name>".to_string()),
            (Some("passcode"), Some(code)) => Ok(Command::Passcode(code.to_string())),
            (Some("passcode"), None) => Err("usage: passcode <6 digits>".to_string()),
            (Some("status"), None) => Ok(Command::Status),
            (Some("quit"), None) => Ok(Command::Quit),
            (Some(other), _) => Err(format!("unknown command: {other}")),
            (None, _) => Err(String::new()),
        }
    }
}

/// Read commands from stdin until `quit`, EOF, or a read error.
pub async fn repl<T: Transport>(client: &Arc<Mutex<LockboxClient<T>>>) {
    println!("Commands:");
    println!("  username <name>    set username (prints the regenerated passcode)");
    println!("  passcode <code>    enter a 6-digit passcode (re-reads lock status)");
    println!("  status             read all status information");
    println!("  quit               exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => dispatch(client, command).await,
                    Err(message) => println!("{message}"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        }
    }
}

/// The lock is taken per attribute operation, not across the write-settle-read
/// sequence, so monitor reads may interleave. Each operation is atomic at the
/// transport; nothing here depends on cross-attribute ordering.
pub async fn dispatch<T: Transport>(client: &Arc<Mutex<LockboxClient<T>>>, command: Command) {
    match command {
        Command::Username(name) => {
            if let Err(e) = client.lock().await.write_username(&name).await {
                println!("failed to set username: {e}");
                return;
            }
            println!("username set to {name}");

            tokio::time::sleep(SETTLE_DELAY).await;
            match client.lock().await.read_passcode().await {
                Ok(code) => println!("generated passcode: {code}"),
                Err(e) => println!("failed to read generated passcode: {e}"),
            }
        }
        Command::Passcode(code) => {
            if let Err(e) = client.lock().await.write_passcode(&code).await {
                println!("failed to send passcode: {e}");
                return;
            }
            println!("passcode sent");

            // The peripheral decides whether the lock opens; re-read to see.
            tokio::time::sleep(SETTLE_DELAY).await;
            match client.lock().await.read_lock_status().await {
                Ok(status) => println!("lock status: {status}"),
                Err(e) => println!("failed to read lock status: {e}"),
            }
        }
        Command::Status => print_status(client).await,
        Command::Quit => {}
    }
}

/// Full status report across all readable attributes. A failing read prints
/// its error and does not block the remaining lines.
pub async fn print_status<T: Transport>(client: &Arc<Mutex<LockboxClient<T>>>) {
    let client = client.lock().await;

    println!("=== LOCKBOX STATUS ===");
    match client.read_username().await {
        Ok(name) => println!("username:        {name}"),
        Err(e) => println!("username:        <{e}>"),
    }
    match client.read_lock_status().await {
        Ok(status) => println!("lock status:     {status}"),
        Err(e) => println!("lock status:     <{e}>"),
    }
    match client.read_user_status().await {
        Ok(status) => {
            println!("auth state:      {}", status.state);
            println!("failed attempts: {}", status.failed_attempts);
            println!("system locked:   {}", status.system_locked);
            println!("tamper detected: {}", status.tamper_detected);
        }
        Err(e) => println!("user status:     <{e}>"),
    }
    match client.read_passcode().await {
        Ok(code) => println!("passcode:        {code}"),
        Err(e) => println!("passcode:        <{e}>"),
    }
    match client.read_voc().await {
        Ok(voc) => println!(
            "voc:             {} PPB (threshold {} PPB, t={})",
            voc.current_voc, voc.threshold, voc.timestamp
        ),
        Err(e) => println!("voc:             <{e}>"),
    }
    println!("======================");
}
