//! Quillpost: a blog REST API with read-through response caching and
//! write-driven cache invalidation.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
