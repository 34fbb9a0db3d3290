//! Exclusive serial session ownership
//!
//! The mount is one physical device behind one serial link, and it cannot
//! process interleaved commands. `SessionManager` is the single authority
//! for opening that link: it hands out at most one live [`Session`] at a
//! time and fails fast with `PortBusy` instead of queuing a second caller
//! behind a mount that may be mid-slew for tens of seconds.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::config::SerialConfig;
use crate::error::{NexStarMountError, Result};
use crate::io::{SerialPortFactory, SerialReader, SerialWriter};

/// Outcome of releasing a session, reported alongside the operation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseStatus {
    /// The port shut down cleanly
    Clean,
    /// The shutdown failed; the reason is carried, never swallowed
    Failed(String),
}

impl CloseStatus {
    pub fn is_clean(&self) -> bool {
        matches!(self, CloseStatus::Clean)
    }
}

/// Exclusive ownership of the open serial link for one GOTO run.
///
/// Holding a `Session` holds the process-wide port lock; the lock is
/// released when the `Session` is dropped. Every exit path of a sequencer
/// run must call [`Session::close`] first so the physical port is shut
/// down before the caller observes the terminal result.
pub struct Session {
    device_path: String,
    reader: Option<Box<dyn SerialReader>>,
    writer: Option<Box<dyn SerialWriter>>,
    closed: bool,
    _guard: OwnedMutexGuard<()>,
}

impl Session {
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    pub fn is_open(&self) -> bool {
        !self.closed
    }

    pub(crate) fn writer_mut(&mut self) -> Result<&mut Box<dyn SerialWriter>> {
        self.writer
            .as_mut()
            .ok_or_else(|| NexStarMountError::Communication("Session already closed".to_string()))
    }

    pub(crate) fn reader_mut(&mut self) -> Result<&mut Box<dyn SerialReader>> {
        self.reader
            .as_mut()
            .ok_or_else(|| NexStarMountError::Communication("Session already closed".to_string()))
    }

    /// Close the serial link. Idempotent; a second call reports `Clean`.
    pub async fn close(&mut self) -> CloseStatus {
        if self.closed {
            return CloseStatus::Clean;
        }
        self.closed = true;

        self.reader = None;

        let status = match self.writer.take() {
            Some(mut writer) => match writer.shutdown().await {
                Ok(()) => CloseStatus::Clean,
                Err(e) => CloseStatus::Failed(e.to_string()),
            },
            None => CloseStatus::Clean,
        };

        match &status {
            CloseStatus::Clean => info!("Serial session on {} closed", self.device_path),
            CloseStatus::Failed(reason) => {
                warn!(
                    "Serial session on {} failed to close: {}",
                    self.device_path, reason
                );
            }
        }
        status
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("device_path", &self.device_path)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// Single authority over opening and closing the physical link
pub struct SessionManager {
    config: SerialConfig,
    factory: Arc<dyn SerialPortFactory>,
    port_lock: Arc<Mutex<()>>,
}

impl SessionManager {
    pub fn new(config: SerialConfig, factory: Arc<dyn SerialPortFactory>) -> Self {
        Self {
            config,
            factory,
            port_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open an exclusive session on the mount's serial port.
    ///
    /// Fails with `PortBusy` if a session is already live, `NoDeviceFound`
    /// if no port is configured and none can be enumerated. Neither
    /// failure touches the hardware, so no cleanup is required.
    pub async fn acquire(&self) -> Result<Session> {
        let guard = Arc::clone(&self.port_lock)
            .try_lock_owned()
            .map_err(|_| NexStarMountError::PortBusy)?;

        let device_path = match &self.config.port {
            Some(port) => port.clone(),
            None => {
                let ports = self.factory.list_ports().await?;
                Self::select_port(ports)?
            }
        };
        debug!("Selected serial device {}", device_path);

        let pair = self
            .factory
            .open(
                &device_path,
                self.config.baud_rate,
                Duration::from_secs(self.config.open_timeout_seconds),
            )
            .await?;

        info!(
            "Serial session opened on {} at {} baud",
            device_path, self.config.baud_rate
        );

        Ok(Session {
            device_path,
            reader: Some(pair.reader),
            writer: Some(pair.writer),
            closed: false,
            _guard: guard,
        })
    }

    /// Deterministic device selection: sort the enumerated paths, prefer
    /// the first containing "USB" or "COM" (hand controls show up as USB
    /// serial adapters), else take the sorted-first entry.
    fn select_port(mut ports: Vec<String>) -> Result<String> {
        if ports.is_empty() {
            return Err(NexStarMountError::NoDeviceFound);
        }
        ports.sort();

        if let Some(preferred) = ports.iter().find(|p| p.contains("USB") || p.contains("COM")) {
            return Ok(preferred.clone());
        }
        Ok(ports.swap_remove(0))
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
