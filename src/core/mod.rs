pub mod ecs;
pub mod world;
