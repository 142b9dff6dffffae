use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;

pub const DEFAULT_PASSWORD_LENGTH: usize = 22;
pub const MAX_PASSWORD_LENGTH: usize = 255;

/// Letters, digits and a few symbols that survive copy and paste. No spaces, quotes or
/// backslashes.
pub const ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._@#%+=";

/// Generates a password of `length` characters, each drawn independently and uniformly from
/// [`ALPHABET`] using the operating system's random number generator.
pub fn gen_password(length: usize) -> String {
    let alphabet = ALPHABET.as_bytes();
    Uniform::from(0..alphabet.len())
        .sample_iter(OsRng)
        .take(length)
        .map(|i| char::from(alphabet[i]))
        .collect()
}
