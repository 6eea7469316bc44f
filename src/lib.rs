//! Duel Sim - two-fighter arcade fighting simulation
//!
//! The `game` module is the simulation core: it never performs I/O and is
//! advanced one tick at a time by whoever owns the clock. The surrounding
//! modules provide the collaborators it needs:
//! - `assets` supplies animation sequences and hit tables per skin
//! - `input` supplies decoded per-tick intents for the human side
//! - `config` loads runner settings and gameplay rules
//! - `runner` drives a match against the wall clock for headless play
//! - `util` holds tick timing and the injectable random source

pub mod assets;
pub mod config;
pub mod game;
pub mod input;
pub mod runner;
pub mod util;
