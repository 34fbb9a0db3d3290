//! NexStar Mount GOTO Driver
//!
//! Commands a NexStar-compatible telescope mount to slew to an equatorial
//! target over its hand control serial link. The driver owns the whole
//! exchange: fixed-point encoding of the RA/Dec pair, exclusive
//! acquisition of the one physical serial port, the timed two-frame GOTO
//! sequence, and a cancellation hook that aborts an in-flight slew.

pub mod config;
pub mod coordinates;
pub mod error;
pub mod io;
#[cfg(feature = "mock")]
pub mod mock;
pub mod protocol;
pub mod sequencer;
pub mod serial;
pub mod session;

pub use config::{load_config, Config, MountConfig, SerialConfig};
pub use coordinates::{encode, Coordinate, EncodedTarget};
pub use error::{NexStarMountError, Result};
pub use io::SerialPortFactory;
pub use sequencer::{CancelHandle, CancelSignal, GotoOutcome, GotoReport, GotoSequencer, GotoState};
pub use session::{CloseStatus, Session, SessionManager};

#[cfg(feature = "mock")]
pub use mock::MockHandControlFactory;

use std::sync::Arc;

use serial::TokioSerialPortFactory;
use tracing::info;

/// Composition root for the driver.
///
/// Holds the session manager and the cancellation slot for the in-flight
/// operation. One `MountDriver` per physical mount; the session lock
/// inside guarantees at most one GOTO runs at a time.
pub struct MountDriver {
    session_manager: SessionManager,
    active_cancel: std::sync::Mutex<Option<CancelHandle>>,
}

impl MountDriver {
    pub fn new(config: Config) -> Self {
        Self::with_factory(config, Arc::new(TokioSerialPortFactory::new()))
    }

    pub fn with_factory(config: Config, factory: Arc<dyn SerialPortFactory>) -> Self {
        Self {
            session_manager: SessionManager::new(config.serial, factory),
            active_cancel: std::sync::Mutex::new(None),
        }
    }

    /// Validate a raw RA/Dec pair and slew to it.
    ///
    /// Out-of-domain input is rejected with `InvalidCoordinate` before any
    /// serial I/O is attempted.
    pub async fn goto_ra_dec(&self, ra_hours: f64, dec_degrees: f64) -> Result<GotoReport> {
        let coordinate = Coordinate::new(ra_hours, dec_degrees)?;
        self.goto(coordinate).await
    }

    /// Slew to an already validated coordinate.
    ///
    /// Fails fast with `PortBusy` while another GOTO is in flight, and
    /// with `NoDeviceFound` when no serial device exists; neither touches
    /// the hardware. Once the session is open, every path through the
    /// sequence ends with the port closed before the report is returned.
    pub async fn goto(&self, coordinate: Coordinate) -> Result<GotoReport> {
        let target = encode(&coordinate);
        info!(
            "GOTO requested: RA {} h, Dec {} deg -> r{},{}",
            coordinate.ra_hours(),
            coordinate.dec_degrees(),
            target.ra_hex(),
            target.dec_hex()
        );

        let session = self.session_manager.acquire().await?;

        let handle = CancelHandle::new();
        let signal = handle.signal();
        self.store_cancel(Some(handle));

        let report = GotoSequencer::new(session).run(&target, signal).await;

        self.store_cancel(None);
        Ok(report)
    }

    /// Abort the in-flight GOTO, if any. A no-op when nothing is running.
    pub fn cancel(&self) {
        if let Ok(slot) = self.active_cancel.lock() {
            if let Some(handle) = slot.as_ref() {
                handle.cancel();
            }
        }
    }

    fn store_cancel(&self, handle: Option<CancelHandle>) {
        if let Ok(mut slot) = self.active_cancel.lock() {
            *slot = handle;
        }
    }
}

impl std::fmt::Debug for MountDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountDriver")
            .field("session_manager", &self.session_manager)
            .finish_non_exhaustive()
    }
}
