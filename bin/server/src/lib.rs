//! HTTP host for the parlance conversation engine.
//!
//! This crate wires the engine to a JSON over HTTP connector and serves a
//! sample bot.

pub mod app;
pub mod bot;
pub mod config;
pub mod web;
