//! HTTP route handlers.

pub mod admin_agenda;
pub mod admin_speakers;
pub mod export;
pub mod front;
pub mod health;
