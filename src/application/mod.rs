// Application layer - Use cases and the store interface they depend on
pub mod controller;
pub mod rate_store;
pub mod series_generator;
