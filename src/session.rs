//! ChatSession actor implementation
//!
//! The session context owns the store, the reconciler and the controller for
//! exactly one joined session. It is constructed explicitly and torn down on
//! leave; nothing about a session outlives it.
//!
//! `run` processes inbound events, user intents and the typing deadline one
//! at a time on a single task, so the store never sees concurrent mutation.

use std::future;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::controller::ActionController;
use crate::message::InboundEvent;
use crate::reconciler::EventReconciler;
use crate::store::{SessionSnapshot, SessionStore};
use crate::transport::Emitter;
use crate::types::ConnectionId;

/// User intents issued by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Join the room under a display name
    Join { username: String },
    /// Broadcast a chat message
    SendMessage { text: String },
    /// The draft input changed
    DraftChanged { draft: String },
    /// Set typing status explicitly
    SetTyping(bool),
    /// Direct message to one connection
    SendPrivateMessage { to: ConnectionId, text: String },
    /// End the session
    Leave,
}

/// One chat session
pub struct ChatSession<E> {
    store: SessionStore,
    reconciler: EventReconciler,
    controller: ActionController<E>,
}

impl<E: Emitter> ChatSession<E> {
    /// Create a session and attach its reconciler
    pub fn new(emitter: E, config: &ClientConfig) -> Self {
        Self::with_reconciler(emitter, config, EventReconciler::new())
    }

    pub fn with_reconciler(
        emitter: E,
        config: &ClientConfig,
        mut reconciler: EventReconciler,
    ) -> Self {
        reconciler.attach();
        Self {
            store: SessionStore::new(),
            reconciler,
            controller: ActionController::new(emitter, config.typing_timeout),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.store.subscribe()
    }

    /// Apply one inbound event
    pub fn handle_inbound(&mut self, event: InboundEvent) {
        self.reconciler.apply(&self.store, event);
    }

    /// Apply one user intent
    ///
    /// Returns false when the intent ends the session.
    pub fn handle_intent(&mut self, intent: Intent, now: Instant) -> bool {
        let result = match intent {
            Intent::Join { username } => self.controller.join(&self.store, &username),
            Intent::SendMessage { text } => self.controller.send_message(&self.store, &text),
            Intent::DraftChanged { draft } => {
                self.controller.draft_changed(&self.store, &draft, now)
            }
            Intent::SetTyping(typing) => self.controller.set_typing(&self.store, typing, now),
            Intent::SendPrivateMessage { to, text } => {
                self.controller.send_private_message(&self.store, to, &text)
            }
            Intent::Leave => return false,
        };

        if let Err(e) = result {
            debug!("Intent refused: {}", e);
        }
        true
    }

    /// Drive the typing timer
    pub fn handle_tick(&mut self, now: Instant) {
        self.controller.on_timer(&self.store, now);
    }

    /// When the next timer fires, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.typing_deadline()
    }

    /// Run the session event loop
    ///
    /// Ends on [`Intent::Leave`], or when both channels are closed. Session
    /// state is discarded on exit.
    pub async fn run(
        mut self,
        mut inbound: mpsc::Receiver<InboundEvent>,
        mut intents: mpsc::Receiver<Intent>,
    ) {
        info!("Chat session started");

        let mut inbound_open = true;
        let mut intents_open = true;

        while inbound_open || intents_open {
            let deadline = self.next_deadline();

            tokio::select! {
                event = inbound.recv(), if inbound_open => match event {
                    Some(event) => self.handle_inbound(event),
                    None => {
                        debug!("Inbound channel closed");
                        inbound_open = false;
                    }
                },
                intent = intents.recv(), if intents_open => match intent {
                    Some(intent) => {
                        if !self.handle_intent(intent, Instant::now()) {
                            info!("Leaving chat");
                            break;
                        }
                    }
                    None => {
                        debug!("Intent channel closed");
                        intents_open = false;
                    }
                },
                _ = sleep_until_deadline(deadline) => {
                    self.handle_tick(Instant::now());
                }
            }
        }

        self.teardown();
        info!("Chat session ended");
    }

    /// Detach handlers, cancel the timer and discard state
    pub fn teardown(&mut self) {
        self.reconciler.detach();
        self.controller.reset();
        self.store.clear();
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
