pub mod catalog;

pub use catalog::ServiceCatalog;
