pub mod landmarks;
pub mod rng;
