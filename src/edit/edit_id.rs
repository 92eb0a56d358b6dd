use sha1::{Digest, Sha1};

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Produces ids of the form `edit-<unix-ms>-<9 base36 chars>`.
///
/// The suffix is derived from a per-generator salt and a counter, so two
/// ids from the same generator never collide even within one millisecond.
#[derive(Debug, Clone)]
pub struct EditIdGenerator {
    salt: String,
    counter: u64,
}

impl EditIdGenerator {
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            counter: 0,
        }
    }

    pub fn next_id(&mut self, now_ms: u64) -> String {
        self.counter += 1;

        let mut hasher = Sha1::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(now_ms.to_be_bytes());
        hasher.update(self.counter.to_be_bytes());
        let digest = hasher.finalize();

        let suffix: String = digest
            .iter()
            .take(ID_SUFFIX_LEN)
            .map(|b| BASE36[usize::from(*b) % BASE36.len()] as char)
            .collect();

        format!("edit-{}-{}", now_ms, suffix)
    }
}
