use rand_core::{OsRng, RngCore};

/// Generate a random 256-bit secret, hex-encoded.
/// Used to sign session tokens when no secret is configured.
pub fn generate_secret() -> String {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    hex::encode(key)
}
