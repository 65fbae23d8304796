pub mod dto;
pub mod extract;
mod owner;
mod public;
pub mod response;
mod router;
pub mod validation;

pub use owner::owner_router;
pub use public::public_router;
pub use router::{AppState, create_router};
