pub mod agent;
pub mod data;
pub mod error;
pub mod gym;
mod macros;
pub mod prelude;
pub mod sim;
