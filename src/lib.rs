// Library crate exposing modules for the binary and integration tests

pub mod cli;
pub mod concern;
pub mod error;
pub mod model;
pub mod report;
pub mod repository;
pub mod util;
