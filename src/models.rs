// src/models.rs

pub mod attendance;
pub mod auth;
