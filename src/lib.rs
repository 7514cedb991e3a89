//! Real-time WebSocket Chat Client Library
//!
//! Keeps a live session against a broadcasting chat server: joins the shared
//! room, keeps an ordered message feed, tracks who is online and who is
//! typing, and sends direct messages alongside the shared channel.
//!
//! # Features
//! - Connection status tracking
//! - Join with a display name
//! - Shared-channel and private messaging
//! - Presence roster and typing indicators (server snapshots)
//! - Debounced outbound typing status
//!
//! # Architecture
//! A single `ChatSession` actor owns all state:
//! - `SessionStore` holds the snapshot and publishes it over a `watch` channel
//! - `EventReconciler` merges inbound events into the store
//! - `ActionController` turns user intents into outbound events
//! - the transport task bridges the WebSocket to `mpsc` channels and
//!   reconnects with backoff
//!
//! No locks needed - one task processes events, intents and timers in order.
//!
//! # Example
//! ```ignore
//! use tokio::sync::mpsc;
//! use live_chat_client::{transport, ChatSession, ClientConfig, Intent};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ClientConfig::default();
//!     let (handle, inbound) =
//!         transport::connect(config.server_url.clone(), config.channel_capacity, config.reconnect);
//!     let (intent_tx, intent_rx) = mpsc::channel(config.channel_capacity);
//!
//!     let session = ChatSession::new(handle, &config);
//!     let mut snapshots = session.subscribe();
//!     tokio::spawn(session.run(inbound, intent_rx));
//!
//!     intent_tx.send(Intent::Join { username: "Alice".into() }).await.unwrap();
//!     while snapshots.changed().await.is_ok() {
//!         println!("{} messages", snapshots.borrow().messages.len());
//!     }
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod message;
pub mod model;
pub mod reconciler;
pub mod roster;
pub mod session;
pub mod store;
pub mod timer;
pub mod transport;
pub mod types;
pub mod view;

// Re-export main types for convenience
pub use config::{ClientArgs, ClientConfig};
pub use controller::ActionController;
pub use error::{ActionError, AppError, PayloadError, SendError};
pub use message::{InboundEvent, InboundEventKind, OutboundEvent};
pub use model::{ChatMessage, ConnectionStatus, Identity};
pub use reconciler::EventReconciler;
pub use roster::{Roster, RosterEntry};
pub use session::{ChatSession, Intent};
pub use store::{SessionSnapshot, SessionStore};
pub use timer::DebounceTimer;
pub use transport::{Backoff, Emitter, TransportHandle};
pub use types::{ConnectionId, MessageId, MessageText, Username};
