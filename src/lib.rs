// LogWatch - lib.rs
//
// Library entry point, exposing all modules for integration testing and
// for embedding the watcher in other programs.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
