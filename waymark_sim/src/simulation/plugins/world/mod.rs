pub mod spawner;
pub mod surface_probe;
