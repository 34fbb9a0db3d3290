//! Equatorial coordinates and their fixed-point wire encoding
//!
//! The hand control addresses the sky as 16-bit fractions of a revolution:
//! right ascension maps 24 hours onto 65536 counts, declination maps 360
//! degrees onto 65536 counts with negative declinations wrapped into
//! [270, 360). Commands carry the counts as 4-digit uppercase hex; the
//! mount compares those strings literally, so the formatting is part of the
//! protocol, not presentation.

use crate::error::{NexStarMountError, Result};

/// A resolved equatorial target, validated at construction.
///
/// Right ascension is in hours, `[0, 24)`. Declination is in degrees,
/// `[-90, 90]`. Values outside the domain (including NaN) are rejected
/// before any serial I/O happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    ra_hours: f64,
    dec_degrees: f64,
}

impl Coordinate {
    pub fn new(ra_hours: f64, dec_degrees: f64) -> Result<Self> {
        if !(ra_hours >= 0.0 && ra_hours < 24.0) {
            return Err(NexStarMountError::InvalidCoordinate(format!(
                "RA {} hours is outside [0, 24)",
                ra_hours
            )));
        }
        if !(dec_degrees >= -90.0 && dec_degrees <= 90.0) {
            return Err(NexStarMountError::InvalidCoordinate(format!(
                "Dec {} degrees is outside [-90, 90]",
                dec_degrees
            )));
        }
        Ok(Self {
            ra_hours,
            dec_degrees,
        })
    }

    pub fn ra_hours(&self) -> f64 {
        self.ra_hours
    }

    pub fn dec_degrees(&self) -> f64 {
        self.dec_degrees
    }
}

/// A coordinate converted to the mount's 16-bit command counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedTarget {
    ra_code: u16,
    dec_code: u16,
}

impl EncodedTarget {
    pub fn ra_code(&self) -> u16 {
        self.ra_code
    }

    pub fn dec_code(&self) -> u16 {
        self.dec_code
    }

    /// RA counts as the 4-digit uppercase hex the mount expects
    pub fn ra_hex(&self) -> String {
        format!("{:04X}", self.ra_code)
    }

    /// Dec counts as the 4-digit uppercase hex the mount expects
    pub fn dec_hex(&self) -> String {
        format!("{:04X}", self.dec_code)
    }
}

/// Encode a validated coordinate into mount command counts.
///
/// Total for any in-domain `Coordinate`: RA strictly below 24 hours keeps
/// the count below 65536, and normalized declination never reaches 360
/// degrees.
pub fn encode(coordinate: &Coordinate) -> EncodedTarget {
    let ra_code = (coordinate.ra_hours() * 65536.0 / 24.0).floor() as u16;

    let mut dec = coordinate.dec_degrees();
    if dec < 0.0 {
        dec += 360.0;
    }
    let dec_code = (dec * 65536.0 / 360.0).floor() as u16;

    EncodedTarget { ra_code, dec_code }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_encodes_to_zero_counts() {
        let target = encode(&Coordinate::new(0.0, 0.0).unwrap());
        assert_eq!(target.ra_hex(), "0000");
        assert_eq!(target.dec_hex(), "0000");
    }

    #[test]
    fn twelve_hours_is_half_a_revolution() {
        let target = encode(&Coordinate::new(12.0, 0.0).unwrap());
        assert_eq!(target.ra_hex(), "8000");
    }

    #[test]
    fn south_pole_wraps_to_270_degrees() {
        let target = encode(&Coordinate::new(0.0, -90.0).unwrap());
        assert_eq!(target.dec_hex(), "C000");
    }

    #[test]
    fn ra_24_is_rejected() {
        assert!(matches!(
            Coordinate::new(24.0, 0.0),
            Err(NexStarMountError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn dec_91_is_rejected() {
        assert!(matches!(
            Coordinate::new(0.0, 91.0),
            Err(NexStarMountError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn nan_is_rejected() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn hex_is_zero_padded_and_uppercase() {
        let target = encode(&Coordinate::new(0.01, 0.1).unwrap());
        assert_eq!(target.ra_hex().len(), 4);
        assert_eq!(target.dec_hex().len(), 4);
        assert_eq!(target.ra_hex(), target.ra_hex().to_uppercase());
    }
}
