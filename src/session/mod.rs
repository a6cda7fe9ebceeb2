//! Transport-agnostic lifecycle of one hosted collector.
//!
//! A session moves through `Created -> Listening -> Serving -> Terminating ->
//! Terminated`. It owns the kill switch and the heartbeat watchdog: an explicit
//! [`Session::kill`] and a missed heartbeat both end in the same idempotent
//! transition to `Terminating`, and every waiter on [`Session::terminated`]
//! observes it.

pub mod config;

pub use config::{generate_token, SessionConfig};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SessionState {
    Created = 0,
    Listening = 1,
    Serving = 2,
    Terminating = 3,
    Terminated = 4,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Created,
            1 => SessionState::Listening,
            2 => SessionState::Serving,
            3 => SessionState::Terminating,
            _ => SessionState::Terminated,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Created => write!(f, "Created"),
            SessionState::Listening => write!(f, "Listening"),
            SessionState::Serving => write!(f, "Serving"),
            SessionState::Terminating => write!(f, "Terminating"),
            SessionState::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Why a session terminated. Only the first trigger is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// An explicit `Kill` call.
    Killed { reason: String },
    /// No ping arrived within the heartbeat window.
    HeartbeatTimeout { timeout_ms: u64 },
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Killed { reason } => write!(f, "killed: {}", reason),
            TerminationReason::HeartbeatTimeout { timeout_ms } => {
                write!(f, "no ping received within {}ms", timeout_ms)
            }
        }
    }
}

/// Errors of the session lifecycle. Fatal for the hosting process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleError {
    /// The listen address could not be bound.
    Bind { address: String, message: String },
    /// A transition was requested from the wrong state.
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::Bind { address, message } => {
                write!(f, "Failed to bind {}: {}", address, message)
            }
            LifecycleError::InvalidTransition { from, to } => {
                write!(f, "Invalid session transition from {} to {}", from, to)
            }
        }
    }
}

impl std::error::Error for LifecycleError {}

/// Lifecycle and heartbeat state of one hosted collector.
pub struct Session {
    id: Uuid,
    config: SessionConfig,
    state: AtomicU8,
    started: Instant,
    /// Milliseconds between `started` and the latest ping.
    last_ping_ms: AtomicU64,
    local_addr: OnceLock<SocketAddr>,
    reason: OnceLock<TerminationReason>,
    kill: CancellationToken,
    span: Span,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!(
            "session",
            session_id = %id,
            transport = tracing::field::Empty
        );
        Self {
            id,
            config,
            state: AtomicU8::new(SessionState::Created as u8),
            started: Instant::now(),
            last_ping_ms: AtomicU64::new(0),
            local_addr: OnceLock::new(),
            reason: OnceLock::new(),
            kill: CancellationToken::new(),
            span,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Logging span carrying the session id; proxies and the watchdog log inside it.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Address actually bound, available once listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    pub fn port(&self) -> Option<u16> {
        self.local_addr().map(|addr| addr.port())
    }

    /// Binds the configured address: `Created -> Listening`.
    pub async fn bind(&self) -> Result<TcpListener, LifecycleError> {
        if self.state() != SessionState::Created {
            return Err(LifecycleError::InvalidTransition {
                from: self.state(),
                to: SessionState::Listening,
            });
        }

        let address = &self.config.listen_address;
        let bind_error = |e: std::io::Error| LifecycleError::Bind {
            address: address.clone(),
            message: e.to_string(),
        };
        let listener = TcpListener::bind(address).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        let _ = self.local_addr.set(local_addr);

        self.transition(SessionState::Created, SessionState::Listening)?;
        info!(parent: &self.span, %local_addr, "Session listening");
        Ok(listener)
    }

    /// `Listening -> Serving`; starts the heartbeat watchdog.
    ///
    /// The heartbeat window starts counting now.
    pub fn start_serving(self: &Arc<Self>) -> Result<JoinHandle<()>, LifecycleError> {
        self.transition(SessionState::Listening, SessionState::Serving)?;
        self.ping();

        let session = Arc::clone(self);
        let watchdog = session.run_watchdog().instrument(self.span.clone());
        Ok(tokio::spawn(watchdog))
    }

    /// Resets the heartbeat deadline.
    pub fn ping(&self) {
        let elapsed = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_ping_ms.store(elapsed, Ordering::Release);
        debug!(parent: &self.span, "Ping received");
    }

    /// Terminates the session. Returns false if termination was already underway.
    pub fn kill(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        info!(parent: &self.span, %reason, "Kill requested");
        self.terminate(TerminationReason::Killed { reason })
    }

    /// `Terminating -> Terminated`, once the listener has been released.
    pub fn mark_terminated(&self) -> Result<(), LifecycleError> {
        self.transition(SessionState::Terminating, SessionState::Terminated)?;
        info!(parent: &self.span, "Session terminated");
        Ok(())
    }

    pub fn is_terminating(&self) -> bool {
        self.kill.is_cancelled()
    }

    /// A token cancelled when the session starts terminating.
    ///
    /// Cancelling the returned token does not terminate the session.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.kill.child_token()
    }

    /// Waits until the session starts terminating and returns why.
    ///
    /// Any number of callers may wait, before or after the signal fired.
    pub async fn terminated(&self) -> TerminationReason {
        self.kill.cancelled().await;
        self.reason
            .get()
            .cloned()
            .unwrap_or_else(|| TerminationReason::Killed {
                reason: String::new(),
            })
    }

    pub fn requires_auth(&self) -> bool {
        self.config.token.is_some()
    }

    /// Checks a caller token. Always succeeds when the session has no token.
    pub fn authenticate(&self, token: &str) -> bool {
        match &self.config.token {
            Some(expected) => expected == token,
            None => true,
        }
    }

    fn transition(&self, from: SessionState, to: SessionState) -> Result<(), LifecycleError> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|actual| LifecycleError::InvalidTransition {
                from: SessionState::from_u8(actual),
                to,
            })
    }

    /// Moves any live state to `Terminating`; the first caller wins.
    fn terminate(&self, reason: TerminationReason) -> bool {
        let moved = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                match SessionState::from_u8(current) {
                    SessionState::Terminating | SessionState::Terminated => None,
                    _ => Some(SessionState::Terminating as u8),
                }
            })
            .is_ok();

        if !moved {
            debug!(parent: &self.span, %reason, "Termination already in progress");
            return false;
        }

        let _ = self.reason.set(reason);
        self.kill.cancel();
        true
    }

    fn last_ping(&self) -> Instant {
        self.started + Duration::from_millis(self.last_ping_ms.load(Ordering::Acquire))
    }

    async fn run_watchdog(self: Arc<Self>) {
        let timeout = self.config.ping_timeout();
        loop {
            let deadline = self.last_ping() + timeout;
            tokio::select! {
                _ = self.kill.cancelled() => break,
                _ = tokio::time::sleep_until(deadline) => {
                    if Instant::now() >= self.last_ping() + timeout {
                        warn!(
                            timeout_ms = self.config.ping_timeout_ms,
                            "Heartbeat lost, terminating session"
                        );
                        self.terminate(TerminationReason::HeartbeatTimeout {
                            timeout_ms: self.config.ping_timeout_ms,
                        });
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod session_tests;

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
