//! NexStar GOTO command frames and protocol timing
//!
//! A GOTO is a two-frame exchange: the coordinate frame `r<RA>,<DEC>\r`
//! loads the target into the hand control, and after a fixed settle delay
//! the slew trigger `L\r` starts the move. The hand control then answers
//! with a single ASCII status token, `"0"` on success.

use std::time::Duration;

use tracing::warn;

use crate::coordinates::EncodedTarget;

/// Firmware needs this long to digest the coordinate frame before it will
/// accept the slew trigger. Empirical device constant, not tunable.
pub const COORDINATE_SETTLE_DELAY: Duration = Duration::from_millis(5000);

/// How long the mount gets to answer the slew trigger before the operation
/// is declared timed out. Empirical device constant, not tunable.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(8000);

/// The only status token the protocol formally defines as success
pub const SUCCESS_TOKEN: &str = "0";

/// Commands that can be sent to the hand control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load the target coordinates
    GotoRaDec(EncodedTarget),
    /// Trigger the slew to the loaded target
    BeginSlew,
}

impl Command {
    /// Serialize the command to the ASCII frame sent over the wire
    pub fn to_frame(&self) -> String {
        match self {
            Command::GotoRaDec(target) => {
                format!("r{},{}\r", target.ra_hex(), target.dec_hex())
            }
            Command::BeginSlew => "L\r".to_string(),
        }
    }
}

/// Interpretation of the mount's status token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlewResponse {
    /// The mount acknowledged the slew with `"0"`
    Acknowledged,
    /// Any other token. The protocol only defines `"0"`, so this is
    /// surfaced raw rather than classified; the vendor docs don't
    /// enumerate failure codes.
    Unexpected(String),
}

/// Interpret a raw status frame from the mount.
///
/// Both variants are terminal responses, not errors — the caller gets the
/// raw payload either way.
pub fn interpret_response(raw: &str) -> SlewResponse {
    let token = raw.trim();
    if token == SUCCESS_TOKEN {
        SlewResponse::Acknowledged
    } else {
        warn!("Unexpected mount response: {:?}", token);
        SlewResponse::Unexpected(token.to_string())
    }
}
