//! Human-readable booking code generation.

use rand::RngExt;

/// Alphabet without ambiguous characters (0/O, 1/I/L).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of the random portion of a booking code.
const CODE_LENGTH: usize = 6;

/// Generate a booking code such as `RH-7K2M9P`.
///
/// Codes are not guaranteed unique by construction; the database holds a
/// unique index and the caller retries on collision.
pub fn generate_booking_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("RH-{suffix}")
}
