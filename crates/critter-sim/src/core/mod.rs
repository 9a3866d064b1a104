pub mod population;
pub mod rng;
pub mod simulation;
pub mod time;
