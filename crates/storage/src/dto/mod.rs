pub mod activity;
pub mod common;
pub mod event;
pub mod gage;
pub mod game;
pub mod player;
pub mod ranking;
pub mod stats;
