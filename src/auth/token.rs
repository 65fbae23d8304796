use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

const TOKEN_PREFIX: &str = "varvault";
const SECRET_BYTES: usize = 32;

/// Generates a project access token with the format: varvault_<secret>
///
/// The secret is 32 bytes from the thread-local CSPRNG, URL-safe base64 encoded.
#[must_use]
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill(&mut bytes);
    format!("{TOKEN_PREFIX}_{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// Generates a random signing secret for owner-plane bearer tokens.
#[must_use]
pub fn generate_signing_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Cheap shape check before touching the store.
#[must_use]
pub fn looks_like_access_token(token: &str) -> bool {
    token
        .strip_prefix(TOKEN_PREFIX)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|secret| {
            !secret.is_empty()
                && secret
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_format() {
        let token = generate_access_token();
        assert!(token.starts_with("varvault_"));
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(token.len(), "varvault_".len() + 43);
        assert!(looks_like_access_token(&token));
    }

    #[test]
    fn test_access_tokens_are_unique() {
        assert_ne!(generate_access_token(), generate_access_token());
    }

    #[test]
    fn test_looks_like_access_token() {
        assert!(!looks_like_access_token(""));
        assert!(!looks_like_access_token("varvault_"));
        assert!(!looks_like_access_token("other_abc"));
        assert!(!looks_like_access_token("varvault_abc def"));
        assert!(looks_like_access_token("varvault_abc-DEF_123"));
    }

    #[test]
    fn test_signing_secret_length() {
        assert_eq!(generate_signing_secret().len(), 43);
    }
}
