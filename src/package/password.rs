//! Archive password generation.

use crate::error::{AuditError, Result};

/// Random bytes behind each password (hex encoded to twice this length).
pub const PASSWORD_BYTES: usize = 16;

/// Generate a fresh 32-character hex password.
pub fn generate_password() -> Result<String> {
    let mut bytes = [0u8; PASSWORD_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| AuditError::Other(anyhow::anyhow!("Failed to generate random bytes: {}", e)))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_32_hex_chars() {
        let password = generate_password().unwrap();
        assert_eq!(password.len(), 32);
        assert!(password.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn passwords_differ() {
        assert_ne!(generate_password().unwrap(), generate_password().unwrap());
    }
}
