pub mod loader;

pub use loader::{listings_from_json, load_listings, read_json, ProductCatalog};
