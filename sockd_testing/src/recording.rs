//! Listener double capturing every lifecycle callback.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use sockd::{Listener, Message, Session, SockdError};

/// Counts lifecycle callbacks and stores dispatched messages so tests
/// can assert on what an application would have observed.
#[derive(Default)]
pub struct RecordingListener {
    opened: AtomicUsize,
    closed: AtomicUsize,
    sessions: Mutex<Vec<Session>>,
    messages: Mutex<Vec<Message>>,
    errors: Mutex<Vec<String>>,
    fail_messages: AtomicBool,
}

impl RecordingListener {
    /// Number of completed handshakes seen.
    #[must_use]
    pub fn opened(&self) -> usize { self.opened.load(Ordering::Acquire) }

    /// Number of close callbacks seen.
    #[must_use]
    pub fn closed(&self) -> usize { self.closed.load(Ordering::Acquire) }

    /// Session handed to the most recent open callback.
    #[must_use]
    pub fn last_session(&self) -> Option<Session> {
        self.sessions.lock().expect("sessions poisoned").last().cloned()
    }

    /// Messages dispatched so far, in arrival order.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().expect("messages poisoned").clone()
    }

    /// Rendered errors reported so far.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("errors poisoned").clone()
    }

    /// Make subsequent message callbacks return an error.
    pub fn fail_messages(&self, fail: bool) {
        self.fail_messages.store(fail, Ordering::Release);
    }

    /// Wait until at least `count` messages have been dispatched.
    ///
    /// Polls rather than blocks so it works under both real and paused
    /// test clocks. Callers bound the wait with a timeout of their own.
    pub async fn wait_for_messages(&self, count: usize) {
        while self.messages.lock().expect("messages poisoned").len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Wait until the open callback has run at least once.
    pub async fn wait_for_open(&self) {
        while self.opened.load(Ordering::Acquire) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Wait until the close callback has run at least once.
    pub async fn wait_for_close(&self) {
        while self.closed.load(Ordering::Acquire) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Listener for RecordingListener {
    async fn on_open(&self, session: Session) -> Result<(), SockdError> {
        self.opened.fetch_add(1, Ordering::AcqRel);
        self.sessions
            .lock()
            .expect("sessions poisoned")
            .push(session);
        Ok(())
    }

    async fn on_message(&self, _session: Session, message: Message) -> Result<(), SockdError> {
        self.messages
            .lock()
            .expect("messages poisoned")
            .push(message);
        if self.fail_messages.load(Ordering::Acquire) {
            return Err(std::io::Error::other("handler refused").into());
        }
        Ok(())
    }

    async fn on_close(&self, _session: Session) {
        self.closed.fetch_add(1, Ordering::AcqRel);
    }

    async fn on_error(&self, _session: Session, error: &SockdError) {
        self.errors
            .lock()
            .expect("errors poisoned")
            .push(error.to_string());
    }
}
