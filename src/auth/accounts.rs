use super::CredentialHasher;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::Identity;

const MAX_USERNAME_LEN: usize = 64;

pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(Error::MissingField("username"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(Error::BadRequest(format!(
            "username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(Error::BadRequest(
            "username can only contain alphanumeric characters, hyphens, underscores, and periods"
                .to_string(),
        ));
    }
    Ok(())
}

/// Creates an account. The plaintext is hashed and dropped.
pub fn register(
    store: &dyn Store,
    hasher: &CredentialHasher,
    username: &str,
    password: &str,
) -> Result<Identity> {
    validate_username(username)?;
    if password.is_empty() {
        return Err(Error::MissingField("password"));
    }

    let hash = hasher.hash(password)?;
    let identity = store.create_identity(username, &hash)?;

    tracing::info!(identity_id = identity.id, "Registered {}", identity.username);
    Ok(identity)
}

/// Checks a username / password pair. Unknown users and wrong passwords
/// both yield `InvalidCredentials`.
pub fn authenticate(
    store: &dyn Store,
    hasher: &CredentialHasher,
    username: &str,
    password: &str,
) -> Result<Identity> {
    let Some(credentials) = store.get_credentials(username)? else {
        hasher.verify_dummy(password);
        return Err(Error::InvalidCredentials);
    };

    if !hasher.verify(password, &credentials.credential_hash)? {
        return Err(Error::InvalidCredentials);
    }

    Ok(credentials.identity)
}
