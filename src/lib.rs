pub mod animation;
pub mod backend;
pub mod cli;
pub mod focus;
pub mod input;
pub mod ipc;
pub mod layer;
pub mod layout;
pub mod output;
pub mod protocol;
pub mod registry;
pub mod scene;
pub mod state;
pub mod utils;
pub mod window;
pub mod workspace;

#[cfg(test)]
mod tests;
