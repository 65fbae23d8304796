mod models;
mod value;

pub use models::*;
pub use value::{TypedValue, VarType, scalar_text};
