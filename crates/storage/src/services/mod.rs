pub mod game_flow;
pub mod lifecycle;
pub mod scoring;
