//! Serial port implementation using tokio-serial
//!
//! This module provides concrete implementations of the I/O traits
//! using tokio-serial for actual hardware communication.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::debug;

use crate::error::{NexStarMountError, Result};
use crate::io::{SerialPair, SerialPortFactory, SerialReader, SerialWriter};

/// Serial reader using tokio-serial
pub struct TokioSerialReader {
    reader: ReadHalf<SerialStream>,
    buffer: [u8; 64],
}

impl TokioSerialReader {
    /// Create a new serial reader from a read half of a serial stream
    pub fn new(reader: ReadHalf<SerialStream>) -> Self {
        Self {
            reader,
            buffer: [0u8; 64],
        }
    }
}

#[async_trait]
impl SerialReader for TokioSerialReader {
    async fn read_frame(&mut self) -> Result<Option<String>> {
        // The hand control answers with a single short ASCII token, so the
        // first chunk of data is the whole frame.
        match self.reader.read(&mut self.buffer).await {
            Ok(0) => Ok(None),
            Ok(n) => {
                let frame = String::from_utf8_lossy(&self.buffer[..n])
                    .trim()
                    .to_string();
                debug!("Serial read: {:?}", frame);
                Ok(Some(frame))
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => Err(NexStarMountError::Timeout(
                "Serial read timed out".to_string(),
            )),
            Err(e) => Err(NexStarMountError::Io(e)),
        }
    }
}

/// Serial writer using tokio-serial
pub struct TokioSerialWriter {
    writer: WriteHalf<SerialStream>,
}

impl TokioSerialWriter {
    /// Create a new serial writer from a write half of a serial stream
    pub fn new(writer: WriteHalf<SerialStream>) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl SerialWriter for TokioSerialWriter {
    async fn write_frame(&mut self, frame: &str) -> Result<()> {
        debug!("Serial write: {:?}", frame);
        self.writer
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| NexStarMountError::WriteFailure(format!("Failed to write: {}", e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| NexStarMountError::WriteFailure(format!("Failed to flush: {}", e)))?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.writer
            .shutdown()
            .await
            .map_err(|e| NexStarMountError::PortCloseFailure(e.to_string()))?;
        Ok(())
    }
}

/// Serial port factory using tokio-serial
#[derive(Default, Clone)]
pub struct TokioSerialPortFactory;

impl TokioSerialPortFactory {
    /// Create a new serial port factory
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SerialPortFactory for TokioSerialPortFactory {
    async fn list_ports(&self) -> Result<Vec<String>> {
        let ports = tokio_serial::available_ports()
            .map_err(|e| NexStarMountError::SerialPort(format!("Port enumeration failed: {}", e)))?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    async fn open(&self, port: &str, baud_rate: u32, timeout: Duration) -> Result<SerialPair> {
        debug!(
            "Opening serial port {} at {} baud with {:?} timeout",
            port, baud_rate, timeout
        );

        // NexStar hand controls speak 9600 8N1; the frame parameters are
        // fixed here so a bad config can't silently garble every command.
        let stream = tokio_serial::new(port, baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .timeout(timeout)
            .open_native_async()
            .map_err(|e| {
                NexStarMountError::SerialPort(format!("Failed to open {}: {}", port, e))
            })?;

        debug!("Serial port {} opened successfully", port);

        let (reader, writer) = tokio::io::split(stream);

        Ok(SerialPair {
            reader: Box::new(TokioSerialReader::new(reader)),
            writer: Box::new(TokioSerialWriter::new(writer)),
        })
    }
}
