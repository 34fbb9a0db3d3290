//! Mock serial port implementation for testing
//!
//! This module provides mock implementations of the serial I/O traits
//! that simulate a NexStar hand control, allowing the driver to run
//! without real hardware.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::io::{SerialPair, SerialPortFactory, SerialReader, SerialWriter};

/// Shared state between mock reader and writer
#[derive(Debug, Default)]
struct MockState {
    response_queue: Vec<String>,
    loaded_target: Option<String>,
}

impl MockState {
    /// Process a command frame and queue the appropriate response
    fn process_frame(&mut self, frame: &str) {
        let frame = frame.trim_end_matches('\r');
        debug!("Mock hand control received: {:?}", frame);

        if let Some(target) = frame.strip_prefix('r') {
            // Coordinate frame: the real hand control stores the target
            // silently and only answers the slew trigger.
            self.loaded_target = Some(target.to_string());
        } else if frame == "L" {
            if self.loaded_target.take().is_some() {
                self.response_queue.push("0".to_string());
            } else {
                // Slew trigger without a loaded target; answer with a
                // non-zero token like a confused hand control would
                self.response_queue.push("1".to_string());
            }
        } else {
            debug!("Mock: unknown frame {:?}", frame);
            self.response_queue.push("?".to_string());
        }
    }

    fn next_response(&mut self) -> Option<String> {
        if self.response_queue.is_empty() {
            None
        } else {
            Some(self.response_queue.remove(0))
        }
    }
}

/// Mock serial reader that returns the simulated hand control's responses
pub struct MockHandControlReader {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl SerialReader for MockHandControlReader {
    async fn read_frame(&mut self) -> Result<Option<String>> {
        let mut state = self.state.lock().await;
        if let Some(response) = state.next_response() {
            debug!("Mock serial read: {:?}", response);
            Ok(Some(response))
        } else {
            debug!("Mock serial read: no response queued");
            Ok(None)
        }
    }
}

/// Mock serial writer that feeds frames to the simulated hand control
pub struct MockHandControlWriter {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl SerialWriter for MockHandControlWriter {
    async fn write_frame(&mut self, frame: &str) -> Result<()> {
        debug!("Mock serial write: {:?}", frame);
        let mut state = self.state.lock().await;
        state.process_frame(frame);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        debug!("Mock serial shutdown");
        Ok(())
    }
}

/// Mock serial port factory simulating one attached hand control
#[derive(Clone, Default)]
pub struct MockHandControlFactory {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl SerialPortFactory for MockHandControlFactory {
    async fn list_ports(&self) -> Result<Vec<String>> {
        Ok(vec!["/dev/mockUSB0".to_string()])
    }

    async fn open(&self, port: &str, baud_rate: u32, _timeout: Duration) -> Result<SerialPair> {
        debug!("Mock serial port opened: {} at {} baud", port, baud_rate);

        Ok(SerialPair {
            reader: Box::new(MockHandControlReader {
                state: Arc::clone(&self.state),
            }),
            writer: Box::new(MockHandControlWriter {
                state: Arc::clone(&self.state),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_goto_exchange_acks_with_zero() {
        let factory = MockHandControlFactory::default();
        let mut pair = factory
            .open("/dev/mockUSB0", 9600, Duration::from_secs(1))
            .await
            .unwrap();

        pair.writer.write_frame("r8000,0000\r").await.unwrap();
        pair.writer.write_frame("L\r").await.unwrap();

        let response = pair.reader.read_frame().await.unwrap().unwrap();
        assert_eq!(response, "0");
    }

    #[tokio::test]
    async fn test_mock_slew_without_target_answers_nonzero() {
        let factory = MockHandControlFactory::default();
        let mut pair = factory
            .open("/dev/mockUSB0", 9600, Duration::from_secs(1))
            .await
            .unwrap();

        pair.writer.write_frame("L\r").await.unwrap();

        let response = pair.reader.read_frame().await.unwrap().unwrap();
        assert_eq!(response, "1");
    }

    #[tokio::test]
    async fn test_mock_no_response_before_slew_trigger() {
        let factory = MockHandControlFactory::default();
        let mut pair = factory
            .open("/dev/mockUSB0", 9600, Duration::from_secs(1))
            .await
            .unwrap();

        pair.writer.write_frame("r8000,0000\r").await.unwrap();
        assert!(pair.reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_factory_lists_one_port() {
        let factory = MockHandControlFactory::default();
        let ports = factory.list_ports().await.unwrap();
        assert_eq!(ports, vec!["/dev/mockUSB0".to_string()]);
    }
}
