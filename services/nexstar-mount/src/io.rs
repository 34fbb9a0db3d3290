//! I/O traits for serial communication
//!
//! This module provides trait abstractions for serial port operations.
//! These traits enable mockall-based testing without requiring actual hardware.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Pair of reader and writer for a serial connection
pub struct SerialPair {
    /// Reader for receiving data
    pub reader: Box<dyn SerialReader>,
    /// Writer for sending data
    pub writer: Box<dyn SerialWriter>,
}

/// Trait for reading status frames from a serial port
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SerialReader: Send {
    /// Wait for one inbound data frame from the mount.
    ///
    /// Returns `Ok(Some(frame))` with the raw ASCII payload when data
    /// arrives, `Ok(None)` if the port was closed, or an error if reading
    /// failed.
    async fn read_frame(&mut self) -> Result<Option<String>>;
}

/// Trait for writing command frames to a serial port
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SerialWriter: Send {
    /// Write a complete command frame (terminator included) and flush it
    async fn write_frame(&mut self, frame: &str) -> Result<()>;

    /// Shut down the write side of the link.
    ///
    /// Called exactly once when the session is released; the outcome is
    /// reported alongside the operation result, never swallowed.
    async fn shutdown(&mut self) -> Result<()>;
}

/// Trait for enumerating and opening serial port connections
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SerialPortFactory: Send + Sync {
    /// List the device paths of all serial ports present on the system
    async fn list_ports(&self) -> Result<Vec<String>>;

    /// Open a serial port connection
    ///
    /// Returns a pair of reader and writer on success.
    async fn open(&self, port: &str, baud_rate: u32, timeout: Duration) -> Result<SerialPair>;
}
