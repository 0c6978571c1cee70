use shared_types::Hash;

// =============================================================================
// NIBBLES: Half-byte addressing into 256-bit keys
// =============================================================================

/// Number of nibbles in a 256-bit key.
pub const KEY_NIBBLES: usize = 64;

/// The nibble of `key` at `depth` (0 = high half of the first byte).
pub fn nibble_at(key: &Hash, depth: usize) -> usize {
    let byte = key[depth / 2];
    if depth % 2 == 0 {
        (byte >> 4) as usize
    } else {
        (byte & 0x0F) as usize
    }
}

/// Number of leading nibbles two keys share.
pub fn common_prefix_len(a: &Hash, b: &Hash) -> usize {
    (0..KEY_NIBBLES)
        .take_while(|&depth| nibble_at(a, depth) == nibble_at(b, depth))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_order() {
        let mut key = [0u8; 32];
        key[0] = 0xAB;
        key[31] = 0xCD;
        assert_eq!(nibble_at(&key, 0), 0xA);
        assert_eq!(nibble_at(&key, 1), 0xB);
        assert_eq!(nibble_at(&key, 62), 0xC);
        assert_eq!(nibble_at(&key, 63), 0xD);
    }

    #[test]
    fn test_common_prefix_len() {
        let a = [0x11u8; 32];
        let mut b = a;
        assert_eq!(common_prefix_len(&a, &b), KEY_NIBBLES);
        b[1] = 0x12;
        assert_eq!(common_prefix_len(&a, &b), 3);
        b[0] = 0x21;
        assert_eq!(common_prefix_len(&a, &b), 0);
    }
}
