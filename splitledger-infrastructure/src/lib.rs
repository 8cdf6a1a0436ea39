#![warn(clippy::uninlined_format_args)]

pub mod clock;
pub mod id_generator;
pub mod store;

pub use clock::SystemClock;
pub use id_generator::UuidIdGenerator;
pub use store::{JsonTripStore, StoreError};
