use super::constants::{ICE_PWD_LEN, ICE_UFRAG_LEN, TLS_ID_LEN};
use rand::Rng;

/// Lowercase letters and digits.
pub const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Builds a `len`-character string drawn uniformly from `charset`.
///
/// Returns an empty string when `charset` is empty.
pub fn rand_string<R: Rng>(len: usize, charset: &[u8], rng: &mut R) -> String {
    if charset.is_empty() {
        return String::new();
    }
    (0..len)
        .map(|_| char::from(charset[rng.gen_range(0..charset.len())]))
        .collect()
}

/// Non-negative session id for a fresh `o=` line.
pub fn session_id<R: Rng>(rng: &mut R) -> i64 {
    rng.gen_range(0..=i64::MAX)
}

/// ICE and DTLS identifiers shared by the sections of one description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportCredentials {
    pub ice_ufrag: String,
    pub ice_pwd: String,
    pub tls_id: String,
}

impl TransportCredentials {
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        Self {
            tls_id: rand_string(TLS_ID_LEN, ALPHANUMERIC, rng),
            ice_ufrag: rand_string(ICE_UFRAG_LEN, ALPHANUMERIC, rng),
            ice_pwd: rand_string(ICE_PWD_LEN, ALPHANUMERIC, rng),
        }
    }
}
