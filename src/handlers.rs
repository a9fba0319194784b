// src/handlers.rs

pub mod auth;
pub mod points;
pub mod users;
