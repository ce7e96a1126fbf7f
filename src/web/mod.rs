// src/web/mod.rs
pub mod admin_handlers;
pub mod agenda_handlers;
pub mod auth_handlers;
pub mod mw_auth;
pub mod mw_papel;
pub mod relatorio_handlers;
pub mod routes;
pub mod uvis_handlers;
