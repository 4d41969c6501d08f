// src/web/mod.rs
pub mod admin_handlers;
pub mod auth_handlers;
pub mod det_af_handlers;
pub mod mw_admin;
pub mod mw_auth;
pub mod response;
pub mod routes;
pub mod user_handlers;
