use std::sync::Arc;

use tinyrand::RandRange;
use tinyrand_std::thread_rand;

// No lookalike characters, so ids survive being read aloud from a log.
const VALID_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const CONNECTION_ID_LEN: usize = 8;

pub fn mini_id(length: usize) -> Arc<str> {
    let mut rng = thread_rand();
    let mut id = String::with_capacity(length);
    let char_count = VALID_CHARS.len();

    for _ in 0..length {
        let idx = rng.next_range(0..char_count);
        id.push(VALID_CHARS[idx] as char);
    }

    Arc::from(id)
}

/// Server-assigned id for one transport session.
pub fn connection_id() -> Arc<str> {
    mini_id(CONNECTION_ID_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_ids_have_fixed_length_and_charset() {
        let id = connection_id();
        assert_eq!(id.len(), CONNECTION_ID_LEN);
        assert!(id.bytes().all(|b| VALID_CHARS.contains(&b)));
    }
}
