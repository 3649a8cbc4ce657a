pub mod devices;
pub mod registry;
