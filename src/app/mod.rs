// Application layer: wires the built-in factories, the manifest and the plugin host together.

pub mod catalog;
pub mod commands;
