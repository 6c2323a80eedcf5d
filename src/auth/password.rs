use once_cell::sync::Lazy;

use crate::error::AppError;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
// Keeps the test suite fast; production always uses the default cost.
#[cfg(test)]
const HASH_COST: u32 = 4;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}

/// A malformed stored hash counts as a failed match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

/// Hash at the same cost as stored passwords, checked when no account matches
/// so a login for an unknown email takes as long as a wrong password.
static UNKNOWN_ACCOUNT_HASH: Lazy<String> =
    Lazy::new(|| bcrypt::hash("unknown-account", HASH_COST).unwrap_or_default());

/// Spends one full verification against a hash no account owns.
pub fn verify_unknown_account(password: &str) {
    let _ = verify_password(password, &UNKNOWN_ACCOUNT_HASH);
}
