//! Wire formats of the upstream weather API.

pub mod openweather;

pub use openweather::{Endpoint, DEFAULT_BASE_URL};
