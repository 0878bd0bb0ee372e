// src/crawl/visited.rs
// =============================================================================
// The set of URLs this crawl has already admitted.
//
// The ONLY operation is try_visit(), which checks and inserts in one step.
// A "contains, then insert" pair would let two tasks both see "not visited"
// for the same URL and crawl it twice, so there is deliberately no separate
// contains() or insert().
//
// URLs are stored as 64-bit FNV-1a fingerprints rather than full strings.
// Two different URLs hashing to the same value count as "already visited";
// that false positive is accepted.
//
// Rust concepts:
// - DashSet: a sharded concurrent set; insert() returns whether it was new
// - &self methods on a shared structure: no Mutex needed around the store
// =============================================================================

use dashmap::DashSet;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

// 64-bit FNV-1a over the exact URL string
pub fn fingerprint(url: &str) -> u64 {
    url.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, Default)]
pub struct VisitedStore {
    seen: DashSet<u64>,
}

impl VisitedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true iff this call is the first to record `fingerprint`.
    pub fn try_visit(&self, fingerprint: u64) -> bool {
        self.seen.insert(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
