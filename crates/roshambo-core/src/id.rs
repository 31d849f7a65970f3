//! Identity types for the session
//!
//! Player identifiers are 64-bit and opaque to callers. They are
//! assigned by the coordinator on connect and never reused within a
//! session.

use std::fmt;

/// Player identity - unique for the lifetime of one session
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

impl PlayerId {
    #[inline]
    pub fn new(id: u64) -> Self {
        PlayerId(id)
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player({:016x})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Collision-free id source for one session.
///
/// A monotonic counter: ids are never reused, and the coordinator is
/// the only caller, so no synchronization is needed.
#[derive(Debug, Default)]
pub struct PlayerIdGen {
    next: u64,
}

impl PlayerIdGen {
    pub fn new() -> Self {
        PlayerIdGen::default()
    }

    pub fn next_id(&mut self) -> PlayerId {
        self.next += 1;
        PlayerId(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_player_id_display_is_hex() {
        let id = PlayerId::new(0xDEADBEEF_CAFEBABE);
        assert_eq!(id.to_string(), "deadbeefcafebabe");
        assert_eq!(format!("{id:?}"), "Player(deadbeefcafebabe)");
    }

    #[test]
    fn test_id_gen_never_repeats() {
        let mut gen = PlayerIdGen::new();
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(gen.next_id()));
        }
    }
}
