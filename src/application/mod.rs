//! Application services: section composition and the storefront pages built on it.

pub mod assets;
pub mod error;
pub mod footer;
pub mod landing;
pub mod listings;
pub mod page;
pub mod sections;
pub mod topbar;
