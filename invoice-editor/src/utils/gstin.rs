//! GSTIN helpers: state code extraction, format checks and inter-state
//! detection.

use thiserror::Error;

pub const GSTIN_LENGTH: usize = 15;

/// GST state codes accepted as the first two characters of a GSTIN.
pub const VALID_STATE_CODES: [&str; 36] = [
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12", "13", "14", "15",
    "16", "17", "18", "19", "20", "21", "22", "23", "24", "26", "27", "29", "30", "31", "32",
    "33", "34", "35", "36", "37", "38",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GstinError {
    #[error("GSTIN is empty")]
    Empty,
    #[error("GSTIN must be 15 characters, got {0}")]
    InvalidLength(usize),
    #[error("Invalid state code: {0}")]
    InvalidStateCode(String),
}

/// First two characters of a GSTIN, if present.
pub fn state_code(gstin: &str) -> Option<&str> {
    gstin.trim().get(..2)
}

/// Supply between two different states. Unknown on either side counts as
/// intra-state.
pub fn is_interstate(seller_state: Option<&str>, buyer_state: Option<&str>) -> bool {
    match (seller_state, buyer_state) {
        (Some(seller), Some(buyer)) if !seller.is_empty() && !buyer.is_empty() => {
            seller != buyer
        }
        _ => false,
    }
}

/// Shape check: 15 characters starting with a known state code.
pub fn validate(gstin: &str) -> Result<(), GstinError> {
    let gstin = gstin.trim().to_ascii_uppercase();
    if gstin.is_empty() {
        return Err(GstinError::Empty);
    }

    let length = gstin.chars().count();
    if length != GSTIN_LENGTH {
        return Err(GstinError::InvalidLength(length));
    }

    let code: String = gstin.chars().take(2).collect();
    if !VALID_STATE_CODES.contains(&code.as_str()) {
        return Err(GstinError::InvalidStateCode(code));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_gstin() {
        assert_eq!(validate("27aaaaa0000a1z5"), Ok(()));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(validate("  "), Err(GstinError::Empty));
        assert_eq!(validate("27AAAAA0000"), Err(GstinError::InvalidLength(11)));
        assert_eq!(
            validate("25AAAAA0000A1Z5"),
            Err(GstinError::InvalidStateCode("25".to_string()))
        );
    }

    #[test]
    fn extracts_state_code() {
        assert_eq!(state_code("29ABCDE1234F1Z5"), Some("29"));
        assert_eq!(state_code("2"), None);
    }

    #[test]
    fn interstate_only_when_both_states_known_and_different() {
        assert!(is_interstate(Some("27"), Some("29")));
        assert!(!is_interstate(Some("27"), Some("27")));
        assert!(!is_interstate(None, Some("29")));
        assert!(!is_interstate(Some("27"), Some("")));
    }
}
