// src/models/mod.rs

pub mod chat;
pub mod plan;
pub mod profile;
pub mod progress;
pub mod user;
