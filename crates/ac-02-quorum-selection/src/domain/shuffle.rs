//! # Seeded Shuffle
//!
//! Fisher-Yates driven by a BLAKE3 hash chain. Identical `(items, seed)`
//! always produce the identical permutation on every platform.

/// Derive a 32-byte seed from a domain tag and an epoch hash.
pub fn seed_from(domain: &str, epoch_hash: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain.as_bytes());
    hasher.update(b":");
    hasher.update(epoch_hash.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Next link of the hash chain.
fn hash_to_seed(state: &[u8; 32], round: u64) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(state);
    hasher.update(&round.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Shuffle a list of items using a seed (Fisher-Yates).
pub fn shuffle_with_seed<T: Clone>(items: &[T], seed: &[u8; 32]) -> Vec<T> {
    let mut result = items.to_vec();
    let len = result.len();

    if len <= 1 {
        return result;
    }

    let mut rng_state = *seed;

    for i in (1..len).rev() {
        rng_state = hash_to_seed(&rng_state, i as u64);
        let mut word = [0u8; 8];
        word.copy_from_slice(&rng_state[0..8]);
        let j = (u64::from_le_bytes(word) % (i as u64 + 1)) as usize;
        result.swap(i, j);
    }

    result
}
