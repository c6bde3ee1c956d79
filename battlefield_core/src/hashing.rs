use std::hash::Hasher;

/// A deterministic FNV-1a 64-bit hasher.
///
/// `DefaultHasher` is randomized per process, so battlefield seeds derived
/// from names go through this instead.
#[derive(Debug)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Stable generation seed for a human-readable label such as a match name.
pub fn seed_from_label(label: &str) -> u64 {
    let mut hasher = FnvHasher::new();
    hasher.write(label.as_bytes());
    hasher.finish()
}
