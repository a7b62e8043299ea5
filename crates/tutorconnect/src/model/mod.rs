/// Plain data records shared by every other module
mod types;

pub use types::*;
