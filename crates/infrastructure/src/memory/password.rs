use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use shared::AppError;

/// パスワードの最小長
pub(super) const MIN_PASSWORD_LENGTH: usize = 6;

// ローカル実行用の軽量パラメータ
fn hasher() -> Result<Argon2<'static>, AppError> {
    let params = Params::new(4096, 1, 1, None)
        .map_err(|e| AppError::Internal(format!("argon2 params: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub(super) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
    Ok(password_hash.to_string())
}

pub(super) fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("stored hash is invalid: {e}")))?;
    Ok(hasher()?
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub(super) fn check_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::WeakPassword(format!(
            "Password should be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_strength() {
        assert!(check_strength("12345").is_err());
        assert!(check_strength("123456").is_ok());
    }
}
