mod server;

pub use server::{HashCost, ServerConfig};
