mod accounts;
mod middleware;
mod password;
mod session;
mod token;

pub use accounts::{authenticate, register, validate_username};
pub use middleware::{AuthError, RequireOwner};
pub use password::CredentialHasher;
pub use session::{Claims, IssuedToken, SigningConfig};
pub use token::{generate_access_token, generate_signing_secret, looks_like_access_token};
