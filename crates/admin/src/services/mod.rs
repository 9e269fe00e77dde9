//! Backend services.

pub mod images;
