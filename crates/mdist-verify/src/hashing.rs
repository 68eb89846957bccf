//! Leaf and pair hashing, as a verifier sees it.
//!
//! `node_hash(Some(a), Some(b))` sorts the pair before hashing. A missing
//! side returns the other side unchanged, which covers the odd node at the
//! end of a layer.

use sha3::{Digest, Keccak256};

use mdist_core::{Account, Amount, Hash32};

/// Packed length of `uint256 || address || uint256`.
const LEAF_PREIMAGE_LEN: usize = 32 + 20 + 32;

pub(crate) fn keccak(data: &[u8]) -> Hash32 {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    Hash32::new(out)
}

pub(crate) fn claim_leaf(index: u64, account: &Account, amount: &Amount) -> Hash32 {
    let mut preimage = [0u8; LEAF_PREIMAGE_LEN];
    preimage[24..32].copy_from_slice(&index.to_be_bytes());
    preimage[32..52].copy_from_slice(account.as_bytes());
    preimage[52..].copy_from_slice(&amount.to_be_bytes());
    keccak(&preimage)
}

pub(crate) fn node_hash(first: Option<&Hash32>, second: Option<&Hash32>) -> Option<Hash32> {
    match (first, second) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(*only),
        (Some(a), Some(b)) => {
            let mut buf = [0u8; 64];
            let (lo, hi) = if a.as_bytes() <= b.as_bytes() { (a, b) } else { (b, a) };
            buf[..32].copy_from_slice(lo.as_bytes());
            buf[32..].copy_from_slice(hi.as_bytes());
            Some(keccak(&buf))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_side_passes_through() {
        let h = Hash32::new([7u8; 32]);
        assert_eq!(node_hash(Some(&h), None), Some(h));
        assert_eq!(node_hash(None, Some(&h)), Some(h));
        assert_eq!(node_hash(None, None), None);
    }

    #[test]
    fn leaf_preimage_layout() {
        let account = Account::from_bytes([0xee; 20]);
        let amount = Amount::from(0x0100);
        let mut expected = Vec::new();
        expected.extend_from_slice(&[0u8; 31]);
        expected.push(9);
        expected.extend_from_slice(&[0xee; 20]);
        expected.extend_from_slice(&[0u8; 30]);
        expected.extend_from_slice(&[0x01, 0x00]);
        assert_eq!(claim_leaf(9, &account, &amount), keccak(&expected));
    }

    proptest! {
        #[test]
        fn node_hash_is_commutative(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let (a, b) = (Hash32::new(a), Hash32::new(b));
            prop_assert_eq!(node_hash(Some(&a), Some(&b)), node_hash(Some(&b), Some(&a)));
        }
    }
}
