//! Configuration sources, in precedence order.

pub mod environment;
pub mod project_file;
pub mod user_file;
