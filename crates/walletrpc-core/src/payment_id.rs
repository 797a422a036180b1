//! Payment identifiers: 32-byte values clients attach to a transaction so an
//! incoming payment can be matched to an invoice.

use std::str::FromStr;

/// Byte length of a payment identifier.
pub const PAYMENT_ID_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentIdError {
    #[error("payment id is not valid hex")]
    InvalidHex,

    #[error("payment id decodes to {0} bytes, expected 32")]
    InvalidLength(usize),
}

/// A decoded payment identifier.
///
/// "No payment id" is modelled as `Option::<PaymentId>::None`; the all-zero
/// value is a valid `PaymentId` and callers decide what it means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentId([u8; PAYMENT_ID_LEN]);

impl PaymentId {
    pub const fn from_bytes(bytes: [u8; PAYMENT_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PAYMENT_ID_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Decode from hex. The input must be exactly 64 hex digits; either case
    /// is accepted.
    pub fn from_hex(s: &str) -> Result<Self, PaymentIdError> {
        let bytes = hex::decode(s).map_err(|_| PaymentIdError::InvalidHex)?;
        let bytes: [u8; PAYMENT_ID_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| PaymentIdError::InvalidLength(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for PaymentId {
    type Err = PaymentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1f2e3d4c5b6a798801f2e3d4c5b6a798801f2e3d4c5b6a798801f2e3d4c5b6a7";

    #[test]
    fn hex_round_trip_is_stable() {
        for seed in [0u8, 1, 0x7f, 0xff] {
            let id = PaymentId::from_bytes([seed; PAYMENT_ID_LEN]);
            let decoded = PaymentId::from_hex(&id.to_hex()).expect("own hex must decode");
            assert_eq!(decoded, id);
            assert_eq!(decoded.to_hex(), id.to_hex());
        }
    }

    #[test]
    fn accepts_uppercase_and_renders_lowercase() {
        let id = PaymentId::from_hex(&SAMPLE.to_uppercase()).expect("uppercase hex must decode");
        assert_eq!(id.to_hex(), SAMPLE);
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn rejects_odd_length_and_non_hex() {
        assert_eq!(
            PaymentId::from_hex(&SAMPLE[..63]),
            Err(PaymentIdError::InvalidHex)
        );
        let mut bad = SAMPLE.to_owned();
        bad.replace_range(0..1, "g");
        assert_eq!(PaymentId::from_hex(&bad), Err(PaymentIdError::InvalidHex));
        assert_eq!(PaymentId::from_hex(" "), Err(PaymentIdError::InvalidHex));
    }

    #[test]
    fn rejects_wrong_byte_length() {
        assert_eq!(
            PaymentId::from_hex(&SAMPLE[..62]),
            Err(PaymentIdError::InvalidLength(31))
        );
        let long = format!("{SAMPLE}00");
        assert_eq!(
            PaymentId::from_hex(&long),
            Err(PaymentIdError::InvalidLength(33))
        );
        assert_eq!(PaymentId::from_hex(""), Err(PaymentIdError::InvalidLength(0)));
    }

    #[test]
    fn zero_detection() {
        assert!(PaymentId::from_bytes([0; PAYMENT_ID_LEN]).is_zero());
        let mut bytes = [0; PAYMENT_ID_LEN];
        bytes[31] = 1;
        assert!(!PaymentId::from_bytes(bytes).is_zero());
    }
}
