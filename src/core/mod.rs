pub mod bounds;
pub mod builder;
pub mod config;
pub mod constants;
pub mod converter;
pub mod geo;
pub mod map;
pub mod projection;
pub mod registry;
pub mod viewport;
