//! WebSocket Chat Client - Entry Point
//!
//! Connects to the server, runs the session actor, reads commands from
//! stdin and prints the feed to stdout. Logs go to stderr.

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

use live_chat_client::input::{parse_line, Command};
use live_chat_client::{
    transport, view, ChatSession, ClientArgs, ConnectionStatus, Intent, SessionSnapshot,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientArgs::parse().into_config()?;

    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=live_chat_client=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("live_chat_client=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Connecting to {}", config.server_url);

    let (handle, inbound) = transport::connect(
        config.server_url.clone(),
        config.channel_capacity,
        config.reconnect,
    );
    let (intent_tx, intent_rx) = mpsc::channel(config.channel_capacity);

    let session = ChatSession::new(handle.clone(), &config);
    let snapshots = session.subscribe();
    let session_task = tokio::spawn(session.run(inbound, intent_rx));
    let render_task = tokio::spawn(render(snapshots.clone()));

    println!("{}", live_chat_client::input::USAGE);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_line(&line) else {
            continue;
        };

        match command {
            Command::Intent(intent) => {
                let leaving = intent == Intent::Leave;
                if let Intent::SendPrivateMessage { to, .. } = &intent {
                    let snap = snapshots.borrow();
                    let own = snap.identity.connection_id.as_ref();
                    if snap.roster.pm_target(to, own).is_none() {
                        println!("No one online with id {}, see /users", to);
                        continue;
                    }
                }
                if intent_tx.send(intent).await.is_err() || leaving {
                    break;
                }
            }
            Command::ListUsers => print_users(&snapshots.borrow()),
            Command::Help(usage) => println!("{}", usage),
        }
    }

    let _ = intent_tx.send(Intent::Leave).await;
    session_task.await?;
    render_task.abort();
    handle.abort();

    info!("Goodbye");
    Ok(())
}

/// Print feed changes as snapshots arrive
async fn render(mut snapshots: watch::Receiver<SessionSnapshot>) {
    let mut printed = 0;
    let mut status = None;
    let mut typing = None;

    while snapshots.changed().await.is_ok() {
        let snap = snapshots.borrow_and_update().clone();

        if status != Some(snap.status) {
            status = Some(snap.status);
            println!("Status: {}", snap.status);
            // The server forgets us with the old connection
            if snap.status == ConnectionStatus::Connected {
                if snap.is_joined() {
                    println!("Reconnected, type /join <name> to rejoin the chat");
                } else {
                    println!("Type /join <name> to enter the chat");
                }
            }
        }

        // Store was cleared
        if snap.messages.len() < printed {
            printed = 0;
        }
        let own = snap.identity.connection_id.as_ref();
        for msg in &snap.messages[printed..] {
            println!("{}", view::message_line(msg, own));
        }
        printed = snap.messages.len();

        let indicator = view::typing_indicator(&snap.others_typing());
        if indicator != typing {
            if let Some(line) = &indicator {
                println!("{}", line);
            }
            typing = indicator;
        }
    }
}

/// Print the online count and who can be sent a private message
fn print_users(snap: &SessionSnapshot) {
    println!("{}", view::online_count(snap.roster.len()));
    for entry in snap.roster.peers(snap.identity.connection_id.as_ref()) {
        println!("  {} [{}]", entry.username, entry.id);
    }
}
