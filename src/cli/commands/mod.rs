pub mod asset;
pub mod ecosystem;
pub mod visitors;
pub mod world;
