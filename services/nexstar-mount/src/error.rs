//! Error types for the NexStar mount driver

/// Errors that can occur when commanding the mount
#[derive(Debug, thiserror::Error)]
pub enum NexStarMountError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("No serial device found")]
    NoDeviceFound,

    #[error("Serial port is busy with another GOTO operation")]
    PortBusy,

    #[error("Serial port error: {0}")]
    SerialPort(String),

    #[error("Write failed: {0}")]
    WriteFailure(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("GOTO cancelled")]
    Cancelled,

    #[error("Port close failed: {0}")]
    PortCloseFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device communication error: {0}")]
    Communication(String),
}

/// Result type alias for mount driver operations
pub type Result<T> = std::result::Result<T, NexStarMountError>;
