pub mod analysis;
pub mod cost;
