// src/handlers/mod.rs

pub mod auth;
pub mod chat;
pub mod plans;
pub mod profile;
pub mod progress;
