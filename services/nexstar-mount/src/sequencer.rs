//! GOTO command sequencer
//!
//! Drives the two-frame GOTO exchange against an exclusively owned
//! [`Session`] as an explicit finite-state machine: one current-state
//! field, transitioned by discrete events (write-complete, timer-fired,
//! data-received, cancel-requested). Exactly one sequencer run can be in
//! flight process-wide; the session lock enforces that.

use std::time::Instant;

use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

use crate::coordinates::EncodedTarget;
use crate::error::Result;
use crate::protocol::{
    interpret_response, Command, SlewResponse, COORDINATE_SETTLE_DELAY, RESPONSE_TIMEOUT,
};
use crate::session::Session;

/// States of a GOTO operation. The four outcome states are terminal and
/// mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoState {
    Idle,
    Opening,
    CoordinatesSent,
    AwaitingSlewAck,
    SlewCommandSent,
    AwaitingResponse,
    Completed,
    TimedOut,
    Failed,
    Cancelled,
}

impl GotoState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GotoState::Completed | GotoState::TimedOut | GotoState::Failed | GotoState::Cancelled
        )
    }
}

/// Terminal outcome of a GOTO run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GotoOutcome {
    /// The mount answered within the response window. The raw token rides
    /// in [`GotoReport::raw_response`]; anything other than `"0"` was
    /// logged as unexpected but is still terminal.
    Completed,
    /// No response within the 8 s window; the mount may be busy or
    /// unresponsive
    TimedOut,
    /// A write or read failed mid-sequence
    Failed(String),
    /// The caller aborted the run
    Cancelled,
}

/// What the caller gets back from a GOTO run.
///
/// `session_closed` reports the port release outcome; a failed close is
/// never hidden behind an otherwise successful GOTO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoReport {
    pub outcome: GotoOutcome,
    pub raw_response: Option<String>,
    pub session_closed: bool,
}

/// Externally triggerable abort for an in-flight GOTO.
///
/// `cancel()` is callable at any time; when no operation is listening it
/// is a no-op, not an error. Cancellation is inherently racy against
/// natural completion and both outcomes are acceptable.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: std::sync::Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// Request cancellation of the in-flight operation, if any
    pub fn cancel(&self) {
        debug!("Cancellation requested");
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe a sequencer run to this handle
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`CancelHandle`]
#[derive(Debug)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Resolve once cancellation is requested. Never resolves if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// State machine driving one GOTO exchange over an open session
pub struct GotoSequencer {
    session: Session,
    state: GotoState,
    started_at: Instant,
}

impl GotoSequencer {
    /// Take exclusive ownership of an open session for one run
    pub fn new(session: Session) -> Self {
        Self {
            session,
            state: GotoState::Idle,
            started_at: Instant::now(),
        }
    }

    pub fn state(&self) -> GotoState {
        self.state
    }

    fn transition(&mut self, to: GotoState) {
        debug!("GOTO state: {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    /// Run the sequence to a terminal outcome.
    ///
    /// Whatever path ends the run — completion, timeout, write failure or
    /// cancellation — the session is closed before the report is returned,
    /// and the close outcome rides in the report.
    pub async fn run(mut self, target: &EncodedTarget, mut cancel: CancelSignal) -> GotoReport {
        self.started_at = Instant::now();
        self.transition(GotoState::Opening);

        let (outcome, raw_response) = self.drive(target, &mut cancel).await;

        let close = self.session.close().await;
        let session_closed = close.is_clean();

        self.transition(match outcome {
            GotoOutcome::Completed => GotoState::Completed,
            GotoOutcome::TimedOut => GotoState::TimedOut,
            GotoOutcome::Failed(_) => GotoState::Failed,
            GotoOutcome::Cancelled => GotoState::Cancelled,
        });

        info!(
            "GOTO finished after {:?}: {:?} (session closed: {})",
            self.started_at.elapsed(),
            outcome,
            session_closed
        );

        GotoReport {
            outcome,
            raw_response,
            session_closed,
        }
    }

    async fn drive(
        &mut self,
        target: &EncodedTarget,
        cancel: &mut CancelSignal,
    ) -> (GotoOutcome, Option<String>) {
        // Coordinate frame
        let frame = Command::GotoRaDec(*target).to_frame();
        match self.write_cancellable(&frame, cancel).await {
            None => return (GotoOutcome::Cancelled, None),
            Some(Err(e)) => return (GotoOutcome::Failed(e.to_string()), None),
            Some(Ok(())) => {}
        }
        self.transition(GotoState::CoordinatesSent);

        // Fixed settle delay before the firmware accepts the slew trigger
        self.transition(GotoState::AwaitingSlewAck);
        tokio::select! {
            _ = cancel.cancelled() => return (GotoOutcome::Cancelled, None),
            _ = sleep(COORDINATE_SETTLE_DELAY) => {}
        }

        // Slew trigger frame
        let frame = Command::BeginSlew.to_frame();
        match self.write_cancellable(&frame, cancel).await {
            None => return (GotoOutcome::Cancelled, None),
            Some(Err(e)) => return (GotoOutcome::Failed(e.to_string()), None),
            Some(Ok(())) => {}
        }
        self.transition(GotoState::SlewCommandSent);

        // Bounded wait for the mount's status token
        self.transition(GotoState::AwaitingResponse);
        let session = &mut self.session;
        tokio::select! {
            _ = cancel.cancelled() => (GotoOutcome::Cancelled, None),
            read = timeout(RESPONSE_TIMEOUT, async {
                session.reader_mut()?.read_frame().await
            }) => match read {
                Err(_elapsed) => (GotoOutcome::TimedOut, None),
                Ok(Ok(Some(raw))) => {
                    if interpret_response(&raw) == SlewResponse::Acknowledged {
                        debug!("Mount acknowledged slew");
                    }
                    (GotoOutcome::Completed, Some(raw))
                }
                Ok(Ok(None)) => (
                    GotoOutcome::Failed(
                        "Serial link closed before the mount responded".to_string(),
                    ),
                    None,
                ),
                Ok(Err(e)) => (GotoOutcome::Failed(e.to_string()), None),
            },
        }
    }

    /// Write a frame, racing the cancellation signal. `None` means the
    /// run was cancelled before the write completed.
    async fn write_cancellable(
        &mut self,
        frame: &str,
        cancel: &mut CancelSignal,
    ) -> Option<Result<()>> {
        let session = &mut self.session;
        tokio::select! {
            _ = cancel.cancelled() => None,
            result = async {
                session.writer_mut()?.write_frame(frame).await
            } => Some(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_terminal() {
        assert!(GotoState::Completed.is_terminal());
        assert!(GotoState::TimedOut.is_terminal());
        assert!(GotoState::Failed.is_terminal());
        assert!(GotoState::Cancelled.is_terminal());
        assert!(!GotoState::Idle.is_terminal());
        assert!(!GotoState::AwaitingResponse.is_terminal());
    }

    #[test]
    fn cancel_with_no_operation_in_flight_is_a_noop() {
        let handle = CancelHandle::new();
        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_signal_resolves_after_cancel() {
        let handle = CancelHandle::new();
        let mut signal = handle.signal();
        handle.cancel();
        signal.cancelled().await;
    }

    #[tokio::test]
    async fn cancel_signal_pends_while_not_cancelled() {
        let handle = CancelHandle::new();
        let mut signal = handle.signal();
        let resolved = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            signal.cancelled(),
        )
        .await;
        assert!(resolved.is_err());
    }

    #[tokio::test]
    async fn cancel_signal_sees_cancellation_issued_before_subscribe() {
        let handle = CancelHandle::new();
        handle.cancel();
        let mut signal = handle.signal();
        signal.cancelled().await;
    }
}
