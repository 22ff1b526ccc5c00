//! Pokedex viewer for PokeAPI built on tui-dispatch.
//!
//! The library exposes the app's modules for the binary and for tests.

pub mod action;
pub mod api;
pub mod effect;
pub mod error;
pub mod reducer;
pub mod sprite;
pub mod sprite_backend;
pub mod state;
pub mod ui;
pub mod view;
