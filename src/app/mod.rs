// LogWatch - app/mod.rs
//
// Application layer: option resolution and the watcher loop.
// Dependencies: core, platform, util.

pub mod options;
pub mod watcher;
