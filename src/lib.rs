//! Server-side page composition for a marketplace storefront.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
