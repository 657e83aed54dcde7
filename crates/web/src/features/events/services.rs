use sqlx::PgPool;
use storage::{
    dto::{
        activity::ApplyBonusRequest,
        event::{
            CreateEventRequest, CurrentGameInfo, EventDetailResponse, EventResponse,
            UpdateEventRequest,
        },
        gage::GageResponse,
        game::GameResponse,
        player::PlayerResponse,
        ranking::{AggregatedPlayerStats, GameScoresResponse, SpawnKills},
    },
    error::Result,
    models::{BonusAward, MasterkillEvent},
    repository::{
        activity::ActivityRepository, event::EventRepository, gage::GageRepository,
        game::GameRepository, ranking::RankingRepository,
    },
    services::{
        game_flow::{self, ManageOutcome},
        lifecycle::EventAction,
    },
};
use uuid::Uuid;

/// List all events, newest first
pub async fn list_events(pool: &PgPool) -> Result<Vec<MasterkillEvent>> {
    let repo = EventRepository::new(pool);
    repo.list().await
}

/// Event with participants, games, current game, winner and gage
pub async fn get_event_detail(pool: &PgPool, id: Uuid) -> Result<EventDetailResponse> {
    let events = EventRepository::new(pool);
    let games = GameRepository::new(pool);

    let event = events.find_by_id(id).await?;
    let participants = events.participants(id).await?;
    let event_games = games.list_for_event(id).await?;
    let completed_games_count = games.count_completed(id).await?;

    let gage = match event.selected_gage_id {
        Some(gage_id) => GageRepository::new(pool).find_by_id(gage_id).await?,
        None => None,
    };

    let winner = event.winner_id.and_then(|winner_id| {
        participants
            .iter()
            .find(|p| p.player_id == winner_id)
            .cloned()
    });

    let current_game = CurrentGameInfo::from_games(event.status, &event_games);

    Ok(EventDetailResponse {
        event: EventResponse::from(event),
        participants: participants.into_iter().map(PlayerResponse::from).collect(),
        games: event_games.into_iter().map(GameResponse::from).collect(),
        completed_games_count,
        current_game,
        winner: winner.map(PlayerResponse::from),
        gage: gage.map(GageResponse::from),
    })
}

pub async fn create_event(pool: &PgPool, request: &CreateEventRequest) -> Result<MasterkillEvent> {
    let repo = EventRepository::new(pool);
    repo.create(request).await
}

pub async fn update_event(
    pool: &PgPool,
    id: Uuid,
    request: &UpdateEventRequest,
) -> Result<MasterkillEvent> {
    let repo = EventRepository::new(pool);
    repo.update(id, request).await
}

pub async fn delete_event(pool: &PgPool, id: Uuid) -> Result<()> {
    let repo = EventRepository::new(pool);
    repo.delete(id).await
}

/// Start the next game, or pause, resume or cancel the event
pub async fn manage_event(pool: &PgPool, id: Uuid, action: EventAction) -> Result<ManageOutcome> {
    game_flow::manage_event(pool, id, action).await
}

pub async fn aggregated_stats(pool: &PgPool, id: Uuid) -> Result<Vec<AggregatedPlayerStats>> {
    let repo = RankingRepository::new(pool);
    repo.event_aggregates(id).await
}

pub async fn game_scores(pool: &PgPool, id: Uuid) -> Result<GameScoresResponse> {
    let repo = RankingRepository::new(pool);
    repo.event_game_scores(id).await
}

pub async fn kills_by_spawn(pool: &PgPool, id: Uuid) -> Result<Vec<SpawnKills>> {
    let repo = RankingRepository::new(pool);
    repo.kills_by_spawn(id).await
}

pub async fn apply_bonus(
    pool: &PgPool,
    id: Uuid,
    request: &ApplyBonusRequest,
) -> Result<BonusAward> {
    let repo = ActivityRepository::new(pool);
    repo.apply_bonus(id, request).await
}

pub async fn list_bonuses(pool: &PgPool, id: Uuid) -> Result<Vec<BonusAward>> {
    // unknown events are a 404, not an empty list
    EventRepository::new(pool).find_by_id(id).await?;

    let repo = ActivityRepository::new(pool);
    repo.list_bonuses(id).await
}
