mod bonus_award;
mod event;
mod gage;
mod game;
mod game_player_stats;
mod player;

pub use bonus_award::BonusAward;
pub use event::{EventStatus, MasterkillEvent};
pub use gage::Gage;
pub use game::{Game, GameStatus};
pub use game_player_stats::{GamePlayerStats, GulagStatus};
pub use player::Player;
