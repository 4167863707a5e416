pub mod error;
pub mod listings;
pub mod navigation;
pub mod sections;
