pub mod agent;
pub mod tilemap;
