use std::collections::HashMap;

use scanner::{ScoreLine, ScreenshotScanner};
use serde::Serialize;
use sqlx::PgPool;
use storage::{
    models::Player,
    repository::{event::EventRepository, game::GameRepository},
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::WebResult;

/// Scanner plus the upload limit, shared with the upload handler
#[derive(Clone)]
pub struct ScreenshotUpload {
    pub scanner: ScreenshotScanner,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScannedPlayer {
    pub gamertag: String,
    pub kills: u32,
    pub revives: u32,
    /// Participant whose gamertag matches, ignoring case
    pub player_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScreenshotScanResponse {
    pub players: Vec<ScannedPlayer>,
}

/// Read a scoreboard screenshot taken during a game of this event
pub async fn scan_for_game(
    pool: &PgPool,
    scanner: &ScreenshotScanner,
    game_id: Uuid,
    image: Vec<u8>,
) -> WebResult<ScreenshotScanResponse> {
    let game = GameRepository::new(pool).find_by_id(game_id).await?;
    let participants = EventRepository::new(pool).participants(game.event_id).await?;

    let lines = scanner.scan(image).await?;

    let players = match_lines(lines, &participant_index(&participants));
    tracing::info!(
        "Screenshot for game {}: {} rows, {} matched participants",
        game.game_number,
        players.len(),
        players.iter().filter(|p| p.player_id.is_some()).count()
    );

    Ok(ScreenshotScanResponse { players })
}

fn participant_index(participants: &[Player]) -> HashMap<String, Uuid> {
    participants
        .iter()
        .map(|p| (p.gamertag.trim().to_lowercase(), p.player_id))
        .collect()
}

fn match_lines(lines: Vec<ScoreLine>, index: &HashMap<String, Uuid>) -> Vec<ScannedPlayer> {
    lines
        .into_iter()
        .map(|line| ScannedPlayer {
            player_id: index.get(&line.gamertag.trim().to_lowercase()).copied(),
            gamertag: line.gamertag,
            kills: line.kills,
            revives: line.revives,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(gamertag: &str, kills: u32, revives: u32) -> ScoreLine {
        ScoreLine {
            gamertag: gamertag.to_string(),
            kills,
            revives,
        }
    }

    #[test]
    fn gamertags_match_participants_ignoring_case() {
        let ghost = Uuid::from_u128(1);
        let index = HashMap::from([("ghost".to_string(), ghost)]);

        let players = match_lines(vec![line("GHOST", 9, 2), line("Soap", 3, 0)], &index);

        assert_eq!(players[0].player_id, Some(ghost));
        assert_eq!(players[0].gamertag, "GHOST");
        assert_eq!((players[0].kills, players[0].revives), (9, 2));
        assert_eq!(players[1].player_id, None);
    }
}
