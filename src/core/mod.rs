// LogWatch - core/mod.rs
//
// Core logic layer.
// Dependencies: standard library and util only.
// Must NOT depend on: platform or app.

pub mod follow;
pub mod model;
