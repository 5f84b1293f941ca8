//! Session runtime executor

use super::replay::ReplayController;
use super::store::{Input, SessionStore, UserAction};
use super::traits::{SessionApi, Transport};
use super::{Request, SessionHandle, Update};
use crate::state_machine::{Action, AppState, Effect, NotifyLevel};
use crate::view::TerminalReplay;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Owns the session store and serializes every change to it
pub struct SessionRuntime<T, A>
where
    T: Transport + 'static,
    A: SessionApi + 'static,
{
    store: SessionStore,
    transport: Arc<T>,
    api: Arc<A>,
    requests: mpsc::Receiver<Request>,
    inbox_open: bool,
    updates: broadcast::Sender<Update>,
    cancel: CancellationToken,
    replay_delay: Duration,
    terminal: TerminalReplay,
    /// Requests received while a replay was running, in arrival order
    deferred: VecDeque<Request>,
}

impl<T, A> SessionRuntime<T, A>
where
    T: Transport + 'static,
    A: SessionApi + 'static,
{
    #[must_use]
    pub fn new(store: SessionStore, transport: T, api: A, replay_delay: Duration) -> (Self, SessionHandle) {
        let (request_tx, requests) = mpsc::channel(64);
        let (updates, _) = broadcast::channel(256);
        let cancel = CancellationToken::new();
        let handle = SessionHandle {
            requests: request_tx,
            updates: updates.clone(),
            cancel: cancel.clone(),
        };
        let runtime = Self {
            store,
            transport: Arc::new(transport),
            api: Arc::new(api),
            requests,
            inbox_open: true,
            updates,
            cancel,
            replay_delay,
            terminal: TerminalReplay::default(),
            deferred: VecDeque::new(),
        };
        (runtime, handle)
    }

    /// Process requests until every handle is dropped or shutdown is requested.
    /// Returns the final session state.
    pub async fn run(mut self) -> AppState {
        tracing::info!("Starting session runtime");

        loop {
            let request = if let Some(request) = self.deferred.pop_front() {
                request
            } else if self.inbox_open {
                tokio::select! {
                    () = self.cancel.cancelled() => break,
                    request = self.requests.recv() => match request {
                        Some(request) => request,
                        None => break,
                    },
                }
            } else {
                break;
            };
            self.handle(request).await;
            if self.cancel.is_cancelled() {
                break;
            }
        }

        tracing::info!(
            session_id = ?self.store.state().session_id,
            messages = self.store.state().messages.len(),
            "Session runtime stopped"
        );
        self.store.state().clone()
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::Event(envelope) => self.process(Input::Event(envelope)).await,
            Request::User(action) => self.dispatch(action).await,
            Request::Replay { session_id } => self.replay(session_id).await,
        }
    }

    async fn dispatch(&mut self, action: UserAction) {
        if let Some(kind) = action.command_kind() {
            if !self.transport.is_connected() {
                tracing::warn!(command = %kind, "Transport unavailable, dropping user action");
                self.notify(NotifyLevel::Error, "Not connected to the agent. Please try again.");
                self.process(Input::Internal(Action::CommandDropped { kind })).await;
                return;
            }
        }
        self.process(Input::User(action)).await;
    }

    /// Apply an input and execute its effects, including any follow-up inputs
    /// the effects produce
    async fn process(&mut self, input: Input) {
        let mut pending = VecDeque::from([input]);

        while let Some(input) = pending.pop_front() {
            if input.resets_transcript() {
                self.terminal.reset();
            }
            let effects = self.store.apply(input);
            let _ = self
                .updates
                .send(Update::State(Arc::new(self.store.state().clone())));

            for effect in effects {
                if let Some(follow_up) = self.execute_effect(effect).await {
                    pending.push_back(follow_up);
                }
            }
        }
    }

    async fn execute_effect(&mut self, effect: Effect) -> Option<Input> {
        match effect {
            Effect::Send(command) => {
                let kind = command.kind();
                match self.transport.send(&command).await {
                    Ok(()) => {
                        tracing::debug!(command = %kind, "Command sent");
                        None
                    }
                    Err(e) => {
                        tracing::error!(command = %kind, error = %e, "Failed to send command");
                        self.notify(NotifyLevel::Error, format!("Failed to send {kind}: {e}"));
                        Some(Input::Internal(Action::CommandDropped { kind }))
                    }
                }
            }
            Effect::Notify { level, message } => {
                self.notify(level, message);
                None
            }
            Effect::FocusAction { message_id } => {
                let writes = self
                    .store
                    .state()
                    .message(&message_id)
                    .map(|message| self.terminal.render(message))
                    .unwrap_or_default();
                if !writes.is_empty() {
                    let _ = self.updates.send(Update::Terminal(writes));
                }
                None
            }
        }
    }

    async fn replay(&mut self, session_id: String) {
        tracing::info!(session_id = %session_id, "Replaying session");

        let events = match self.api.session_events(&session_id).await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Failed to load session events");
                self.notify(NotifyLevel::Error, format!("Failed to load session: {e}"));
                self.process(Input::Internal(Action::ReplayFailed)).await;
                return;
            }
        };

        let replay = ReplayController::new(session_id, events);
        self.process(replay.started()).await;

        let mut applied = 0usize;
        for envelope in replay.envelopes() {
            if !self.pace().await {
                tracing::info!(session_id = %replay.session_id(), applied, "Replay stopped by shutdown");
                return;
            }
            self.process(Input::Event(envelope)).await;
            applied += 1;
        }

        self.process(replay.finished()).await;
        tracing::info!(
            session_id = %replay.session_id(),
            events = applied,
            deferred = self.deferred.len(),
            "Replay complete"
        );
    }

    /// Wait out the replay delay, deferring requests that arrive meanwhile.
    /// Returns false on shutdown.
    async fn pace(&mut self) -> bool {
        let sleep = tokio::time::sleep(self.replay_delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => return true,
                () = self.cancel.cancelled() => return false,
                request = self.requests.recv(), if self.inbox_open => match request {
                    Some(request) => {
                        tracing::debug!("Deferring request until replay completes");
                        self.deferred.push_back(request);
                    }
                    None => self.inbox_open = false,
                },
            }
        }
    }

    fn notify(&self, level: NotifyLevel, message: impl Into<String>) {
        let _ = self.updates.send(Update::Notice {
            level,
            message: message.into(),
        });
    }
}
