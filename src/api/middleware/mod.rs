//! Request middleware.

pub mod access_log;
