//! Transaction extra codec.
//!
//! The extra blob is a sequence of tagged fields:
//!
//! | tag    | field              | payload                                |
//! |--------|--------------------|----------------------------------------|
//! | `0x00` | padding            | zero bytes up to the end of the blob   |
//! | `0x01` | tx public key      | 32 bytes                               |
//! | `0x02` | nonce              | 1 length byte + that many bytes        |
//! | `0x03` | merge-mining tag   | varint length + that many bytes        |
//!
//! A payment id travels inside the first nonce field as `0x00 || id[32]`.
//! Blobs come from the chain and are untrusted: every parser here is total
//! and reports malformed input as "no payment id".

use crate::payment_id::{PaymentId, PAYMENT_ID_LEN};

const TAG_PADDING: u8 = 0x00;
const TAG_PUBKEY: u8 = 0x01;
const TAG_NONCE: u8 = 0x02;
const TAG_MERGE_MINING: u8 = 0x03;

const PADDING_MAX_COUNT: usize = 255;
const PUBKEY_LEN: usize = 32;
const NONCE_PAYMENT_ID: u8 = 0x00;

/// A parsed extra field. Only the parts the wallet RPC cares about are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExtraField<'a> {
    Padding,
    PublicKey,
    Nonce(&'a [u8]),
    MergeMining,
}

/// Extract the payment id carried by `extra`, if any.
///
/// Returns `None` when the blob is malformed anywhere, when it has no nonce
/// field, or when its first nonce field is not a payment-id nonce.
pub fn payment_id_from_extra(extra: &[u8]) -> Option<PaymentId> {
    let fields = parse_fields(extra)?;
    let nonce = fields.into_iter().find_map(|field| match field {
        ExtraField::Nonce(data) => Some(data),
        _ => None,
    })?;
    payment_id_from_nonce(nonce)
}

/// Build a fresh extra blob holding only a payment-id nonce.
pub fn extra_with_payment_id(payment_id: &PaymentId) -> Vec<u8> {
    let mut nonce = Vec::with_capacity(1 + PAYMENT_ID_LEN);
    nonce.push(NONCE_PAYMENT_ID);
    nonce.extend_from_slice(payment_id.as_bytes());

    let mut extra = Vec::with_capacity(2 + nonce.len());
    extra.push(TAG_NONCE);
    // 33 always fits the single length byte.
    extra.push(nonce.len() as u8);
    extra.extend_from_slice(&nonce);
    extra
}

fn payment_id_from_nonce(nonce: &[u8]) -> Option<PaymentId> {
    let (&kind, rest) = nonce.split_first()?;
    if kind != NONCE_PAYMENT_ID {
        return None;
    }
    let bytes: [u8; PAYMENT_ID_LEN] = rest.try_into().ok()?;
    Some(PaymentId::from_bytes(bytes))
}

fn parse_fields(extra: &[u8]) -> Option<Vec<ExtraField<'_>>> {
    let mut reader = extra;
    let mut fields = Vec::new();

    while let Some((&tag, rest)) = reader.split_first() {
        reader = rest;
        match tag {
            TAG_PADDING => {
                // Padding runs to the end of the blob.
                if reader.len() + 1 > PADDING_MAX_COUNT || reader.iter().any(|b| *b != 0) {
                    return None;
                }
                reader = &[];
                fields.push(ExtraField::Padding);
            }
            TAG_PUBKEY => {
                take(&mut reader, PUBKEY_LEN)?;
                fields.push(ExtraField::PublicKey);
            }
            TAG_NONCE => {
                let (&len, rest) = reader.split_first()?;
                reader = rest;
                fields.push(ExtraField::Nonce(take(&mut reader, usize::from(len))?));
            }
            TAG_MERGE_MINING => {
                let len = read_varint(&mut reader)?;
                let len = usize::try_from(len).ok()?;
                take(&mut reader, len)?;
                fields.push(ExtraField::MergeMining);
            }
            _ => return None,
        }
    }

    Some(fields)
}

fn take<'a>(reader: &mut &'a [u8], len: usize) -> Option<&'a [u8]> {
    if reader.len() < len {
        return None;
    }
    let (head, tail) = reader.split_at(len);
    *reader = tail;
    Some(head)
}

/// LEB128-style varint: 7 bits per byte, least significant group first.
fn read_varint(reader: &mut &[u8]) -> Option<u64> {
    let mut value: u64 = 0;
    for shift in (0..64).step_by(7) {
        let (&byte, rest) = reader.split_first()?;
        *reader = rest;
        let group = u64::from(byte & 0x7f);
        // Reject groups that overflow 64 bits.
        if shift == 63 && group > 1 {
            return None;
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            // Non-canonical trailing zero group.
            if byte == 0 && shift > 0 {
                return None;
            }
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_id() -> PaymentId {
        let mut bytes = [0u8; PAYMENT_ID_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8 + 1;
        }
        PaymentId::from_bytes(bytes)
    }

    fn pubkey_field() -> Vec<u8> {
        let mut field = vec![TAG_PUBKEY];
        field.extend_from_slice(&[0xAB; PUBKEY_LEN]);
        field
    }

    #[test]
    fn embedded_id_is_extracted() {
        let id = sample_id();
        let extra = extra_with_payment_id(&id);
        assert_eq!(extra.len(), 35);
        assert_eq!(&extra[..3], &[TAG_NONCE, 33, NONCE_PAYMENT_ID]);
        assert_eq!(payment_id_from_extra(&extra), Some(id));
    }

    #[test]
    fn id_after_pubkey_and_before_padding() {
        let id = sample_id();
        let mut extra = pubkey_field();
        extra.extend(extra_with_payment_id(&id));
        extra.extend_from_slice(&[TAG_PADDING, 0, 0, 0]);
        assert_eq!(payment_id_from_extra(&extra), Some(id));
    }

    #[test]
    fn merge_mining_field_is_skipped() {
        let id = sample_id();
        let mut extra = vec![TAG_MERGE_MINING, 0x21];
        extra.extend_from_slice(&[0x11; 0x21]);
        extra.extend(extra_with_payment_id(&id));
        assert_eq!(payment_id_from_extra(&extra), Some(id));
    }

    #[test]
    fn empty_and_pubkey_only_blobs_have_no_id() {
        assert_eq!(payment_id_from_extra(&[]), None);
        assert_eq!(payment_id_from_extra(&pubkey_field()), None);
    }

    #[test]
    fn only_first_nonce_is_considered() {
        let id = sample_id();
        let mut extra = vec![TAG_NONCE, 3, 0x01, 0xAA, 0xBB];
        extra.extend(extra_with_payment_id(&id));
        assert_eq!(payment_id_from_extra(&extra), None);
    }

    #[test]
    fn nonce_with_wrong_size_is_not_an_id() {
        let mut extra = vec![TAG_NONCE, 32, NONCE_PAYMENT_ID];
        extra.extend_from_slice(&[0x42; 31]);
        assert_eq!(payment_id_from_extra(&extra), None);
    }

    #[test]
    fn truncated_blobs_yield_none() {
        let full = {
            let mut extra = pubkey_field();
            extra.extend(extra_with_payment_id(&sample_id()));
            extra
        };
        for cut in 1..full.len() {
            assert_eq!(payment_id_from_extra(&full[..cut]), None, "prefix len {cut}");
        }
        assert_eq!(payment_id_from_extra(&full), Some(sample_id()));
    }

    #[test]
    fn unknown_tag_poisons_the_whole_blob() {
        let mut extra = extra_with_payment_id(&sample_id());
        extra.push(0x7f);
        assert_eq!(payment_id_from_extra(&extra), None);
    }

    #[test]
    fn non_zero_padding_is_malformed() {
        let mut extra = extra_with_payment_id(&sample_id());
        extra.extend_from_slice(&[TAG_PADDING, 0, 1]);
        assert_eq!(payment_id_from_extra(&extra), None);
    }

    #[test]
    fn oversized_padding_is_malformed() {
        let mut extra = extra_with_payment_id(&sample_id());
        extra.push(TAG_PADDING);
        extra.extend(std::iter::repeat(0).take(PADDING_MAX_COUNT));
        assert_eq!(payment_id_from_extra(&extra), None);
    }

    #[test]
    fn garbage_never_panics() {
        let mut state: u32 = 0x1234_5678;
        for len in 0..200usize {
            let blob: Vec<u8> = (0..len)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 17;
                    state ^= state << 5;
                    (state & 0xff) as u8
                })
                .collect();
            let _ = payment_id_from_extra(&blob);
        }
        let _ = payment_id_from_extra(&[TAG_MERGE_MINING, 0xff, 0xff, 0xff, 0xff, 0xff]);
        let _ = payment_id_from_extra(&[TAG_MERGE_MINING; 12]);
    }

    #[test]
    fn varint_decoding() {
        let mut r: &[u8] = &[0x21];
        assert_eq!(read_varint(&mut r), Some(0x21));
        let mut r: &[u8] = &[0xac, 0x02];
        assert_eq!(read_varint(&mut r), Some(300));
        let mut r: &[u8] = &[0x80];
        assert_eq!(read_varint(&mut r), None);
        let mut r: &[u8] = &[0x80, 0x00];
        assert_eq!(read_varint(&mut r), None);
        let mut r: &[u8] = &[0xff; 11];
        assert_eq!(read_varint(&mut r), None);
    }
}
