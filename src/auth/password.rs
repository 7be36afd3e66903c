use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

pub fn hash_password(password: &str) -> String {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

pub fn verify_password(password: &str, hashed: &str) -> Result<(), argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    argon2.verify_password(password.as_bytes(), &parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let hash = hash_password("secret123");
        assert!(verify_password("secret123", &hash).is_ok());
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("secret123");
        assert!(verify_password("Secret123", &hash).is_err());
    }

    #[test]
    fn hash_is_salted() {
        // Same password, different salt, different hash.
        assert_ne!(hash_password("secret123"), hash_password("secret123"));
    }

    #[test]
    fn garbage_hash_is_an_error_not_a_panic() {
        assert!(verify_password("secret123", "not-a-phc-string").is_err());
    }
}
