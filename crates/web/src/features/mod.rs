pub mod activity;
pub mod events;
pub mod gages;
pub mod games;
pub mod players;
pub mod rankings;
pub mod screenshots;
