//! Small pure helpers shared by the domain and the engine's storage layer.

mod datetime;
mod nullable;
mod string;

pub use datetime::{day_count, parse_datetime};
pub use nullable::nullable;
pub use string::some_if_not_empty;
