//! Tests for coordinate validation and wire encoding

use nexstar_mount::{encode, Coordinate, NexStarMountError};
use proptest::prelude::*;

// ============================================================================
// Reference vectors
// ============================================================================

#[test]
fn origin_encodes_to_zero() {
    let target = encode(&Coordinate::new(0.0, 0.0).unwrap());
    assert_eq!(target.ra_hex(), "0000");
    assert_eq!(target.dec_hex(), "0000");
}

#[test]
fn ra_12_hours_encodes_to_8000() {
    let target = encode(&Coordinate::new(12.0, 0.0).unwrap());
    assert_eq!(target.ra_hex(), "8000");
}

#[test]
fn dec_minus_90_normalizes_to_270_degrees() {
    // floor(270 * 65536 / 360) = 49152 = 0xC000
    let target = encode(&Coordinate::new(0.0, -90.0).unwrap());
    assert_eq!(target.dec_hex(), "C000");
}

#[test]
fn dec_90_encodes_to_4000() {
    let target = encode(&Coordinate::new(0.0, 90.0).unwrap());
    assert_eq!(target.dec_hex(), "4000");
}

// ============================================================================
// Domain validation
// ============================================================================

#[test]
fn ra_at_24_is_invalid() {
    let err = Coordinate::new(24.0, 0.0).unwrap_err();
    assert!(matches!(err, NexStarMountError::InvalidCoordinate(_)));
    assert!(err.to_string().contains("RA"));
}

#[test]
fn negative_ra_is_invalid() {
    assert!(Coordinate::new(-0.1, 0.0).is_err());
}

#[test]
fn dec_at_91_is_invalid() {
    let err = Coordinate::new(0.0, 91.0).unwrap_err();
    assert!(matches!(err, NexStarMountError::InvalidCoordinate(_)));
    assert!(err.to_string().contains("Dec"));
}

#[test]
fn dec_below_minus_90_is_invalid() {
    assert!(Coordinate::new(0.0, -90.5).is_err());
}

#[test]
fn domain_boundaries_are_accepted() {
    assert!(Coordinate::new(0.0, -90.0).is_ok());
    assert!(Coordinate::new(23.999, 90.0).is_ok());
}

// ============================================================================
// Encoding properties
// ============================================================================

/// One RA encoding quantum: 24 hours over 65536 counts
const RA_QUANTUM: f64 = 24.0 / 65536.0;

/// One Dec encoding quantum: 360 degrees over 65536 counts
const DEC_QUANTUM: f64 = 360.0 / 65536.0;

proptest! {
    #[test]
    fn ra_roundtrips_within_one_quantum(ra in 0.0f64..24.0) {
        let target = encode(&Coordinate::new(ra, 0.0).unwrap());
        let decoded = target.ra_code() as f64 * 24.0 / 65536.0;
        prop_assert!(
            (ra - decoded).abs() <= RA_QUANTUM,
            "ra {} decoded to {}", ra, decoded
        );
    }

    #[test]
    fn dec_roundtrips_within_one_quantum(dec in -90.0f64..=90.0) {
        let target = encode(&Coordinate::new(0.0, dec).unwrap());
        let mut decoded = target.dec_code() as f64 * 360.0 / 65536.0;
        if decoded > 180.0 {
            decoded -= 360.0;
        }
        prop_assert!(
            (dec - decoded).abs() <= DEC_QUANTUM,
            "dec {} decoded to {}", dec, decoded
        );
    }

    #[test]
    fn hex_strings_are_always_4_uppercase_digits(ra in 0.0f64..24.0, dec in -90.0f64..=90.0) {
        let target = encode(&Coordinate::new(ra, dec).unwrap());
        for hex in [target.ra_hex(), target.dec_hex()] {
            prop_assert_eq!(hex.len(), 4);
            prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }
}
