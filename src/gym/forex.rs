pub mod account;
pub mod action;
pub mod config;
pub mod diagnostics;
pub mod env;
pub mod observation;
pub mod order;
pub mod reward;
pub mod simulator;
pub mod space;
pub mod spread;
pub mod types;
