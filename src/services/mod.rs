// src/services/mod.rs
pub mod auth_service;
pub mod det_af_service;
pub mod grades_service;
pub mod user_service;
