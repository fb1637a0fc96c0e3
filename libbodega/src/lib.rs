//! This is a library for recording sightings of bodega cats: photos of cats
//! spotted near corner stores, tagged with a location and some free text.
//!
//! The library owns everything below the HTTP layer: the [sighting::Sighting]
//! records and the database that holds them, the directory where uploaded
//! photos are kept, and the steps an upload goes through before it becomes a
//! record.

pub mod database;
pub mod error;
pub mod normalize;
pub mod sighting;
pub mod storage;
pub mod upload;

pub use database::Database;
pub use error::Error;
pub use error::Result;
