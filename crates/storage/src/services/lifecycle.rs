//! State rules for events and their games.
//!
//! Everything here is free of I/O. `services::game_flow` loads rows, asks these
//! functions what to do and persists the outcome inside one transaction.

use std::cmp::Ordering;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{EventStatus, Game, GameStatus};

/// Chance that a new game gets a random kill multiplier
pub const KILL_MULTIPLIER_CHANCE: f64 = 0.10;

/// Multipliers the draw picks from
pub const KILL_MULTIPLIERS: [Decimal; 4] = [
    Decimal::from_parts(10, 0, 0, false, 1),
    Decimal::from_parts(15, 0, 0, false, 1),
    Decimal::from_parts(20, 0, 0, false, 1),
    Decimal::from_parts(25, 0, 0, false, 1),
];

/// Organizer actions accepted by the manage-game endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    StartNextGame,
    Pause,
    Resume,
    Cancel,
}

/// The part of a game row the planner looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSlot {
    pub game_id: Uuid,
    pub game_number: i32,
    pub status: GameStatus,
}

impl From<&Game> for GameSlot {
    fn from(game: &Game) -> Self {
        Self {
            game_id: game.game_id,
            game_number: game.game_number,
            status: game.status,
        }
    }
}

/// What `start_next_game` has to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextGame {
    /// A game is already running; hand it back untouched
    AlreadyRunning(Uuid),
    /// The last game exists but was never started
    StartPending(Uuid),
    /// Insert the game with this number
    Create(i32),
}

pub fn plan_next_game(status: EventStatus, games: &[GameSlot], planned: i32) -> Result<NextGame> {
    match status {
        EventStatus::Completed | EventStatus::Cancelled => {
            return Err(StorageError::invalid_state(
                "This Masterkill is completed or cancelled",
            ));
        }
        EventStatus::Paused => {
            return Err(StorageError::invalid_state(
                "This Masterkill is paused, resume it first",
            ));
        }
        EventStatus::Pending | EventStatus::Inprogress => {}
    }

    if let Some(running) = games
        .iter()
        .filter(|g| g.status == GameStatus::Inprogress)
        .min_by_key(|g| g.game_number)
    {
        return Ok(NextGame::AlreadyRunning(running.game_id));
    }

    let next_number = match games.iter().max_by_key(|g| g.game_number) {
        None => 1,
        Some(last) => match last.status {
            GameStatus::Completed => last.game_number + 1,
            GameStatus::Pending => return Ok(NextGame::StartPending(last.game_id)),
            GameStatus::Inprogress => {
                return Err(StorageError::invalid_state(format!(
                    "Game {} must be handled first",
                    last.game_number
                )));
            }
        },
    };

    if next_number > planned {
        return Err(StorageError::invalid_state(
            "All planned games have been played",
        ));
    }

    Ok(NextGame::Create(next_number))
}

/// Whether completing games has exhausted the event's plan
pub fn plan_is_exhausted(completed_games: i64, planned: i32) -> bool {
    completed_games >= i64::from(planned)
}

/// A planned count may not fall to or below the games already completed while
/// the event is still open, otherwise nothing would ever close it
pub fn check_planned_count(status: EventStatus, completed_games: i64, planned: i32) -> Result<()> {
    let minimum = if status.is_closed() {
        completed_games
    } else {
        completed_games + 1
    };

    if i64::from(planned) < minimum {
        return Err(StorageError::invalid_state(format!(
            "{} games are already completed, plan at least {}",
            completed_games, minimum
        )));
    }
    Ok(())
}

/// Stats and activity logs are frozen once an event is cancelled
pub fn ensure_stats_editable(status: EventStatus) -> Result<()> {
    if status == EventStatus::Cancelled {
        return Err(StorageError::invalid_state("This Masterkill is cancelled"));
    }
    Ok(())
}

/// What is known about an event right after one of its games completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub completed_games: i64,
    pub planned: i32,
    pub top1_solo_ends_event: bool,
    /// Participant reported as top 1 solo, if any
    pub solo_winner: Option<Uuid>,
    /// Winner set by hand before the end
    pub manual_winner: Option<Uuid>,
}

/// How a game completion leaves its event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// More games are planned
    Continue,
    /// The event is over and this player wins
    Decided(Uuid),
    /// The event is over; the winner comes from the final standings
    FromStandings,
}

impl Ending {
    pub fn is_over(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// A top 1 solo ends the event at once when the event allows it; otherwise the
/// event ends with its last planned game
pub fn finish(completion: &Completion) -> Ending {
    let solo = completion
        .solo_winner
        .filter(|_| completion.top1_solo_ends_event);

    if let Some(player_id) = solo {
        return Ending::Decided(player_id);
    }
    if !plan_is_exhausted(completion.completed_games, completion.planned) {
        return Ending::Continue;
    }

    match completion.manual_winner {
        Some(player_id) => Ending::Decided(player_id),
        None => Ending::FromStandings,
    }
}

/// Status reached by applying a pause, resume or cancel action
pub fn transition(current: EventStatus, action: EventAction) -> Result<EventStatus> {
    match (action, current) {
        (EventAction::Pause, EventStatus::Inprogress) => Ok(EventStatus::Paused),
        (EventAction::Resume, EventStatus::Paused) => Ok(EventStatus::Inprogress),
        (EventAction::Cancel, status) if !status.is_closed() => Ok(EventStatus::Cancelled),
        (EventAction::StartNextGame, _) => Err(StorageError::invalid_state(
            "start_next_game is not a status transition",
        )),
        (action, status) => Err(StorageError::invalid_state(format!(
            "Cannot {:?} a Masterkill that is {}",
            action, status
        ))),
    }
}

/// Kill multiplier for a freshly created game
pub fn roll_kill_multiplier<R: Rng + ?Sized>(enabled: bool, rng: &mut R) -> Decimal {
    if enabled && rng.random_bool(KILL_MULTIPLIER_CHANCE) {
        KILL_MULTIPLIERS[rng.random_range(0..KILL_MULTIPLIERS.len())]
    } else {
        Decimal::ONE
    }
}

/// A participant's standing used to decide the winner of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub player_id: Uuid,
    pub gamertag: String,
    pub total: Decimal,
    pub deaths: i64,
}

/// Highest total wins; ties go to fewer deaths, then to the gamertag
pub fn pick_winner(standings: &[Standing]) -> Option<Uuid> {
    standings
        .iter()
        .min_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.deaths.cmp(&b.deaths))
                .then_with(|| compare_gamertags(&a.gamertag, &b.gamertag))
        })
        .map(|s| s.player_id)
}

fn compare_gamertags(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use rust_decimal_macros::dec;

    fn slot(number: i32, status: GameStatus) -> GameSlot {
        GameSlot {
            game_id: Uuid::from_u128(number as u128),
            game_number: number,
            status,
        }
    }

    #[test]
    fn first_game_is_created_for_a_fresh_event() {
        let plan = plan_next_game(EventStatus::Pending, &[], 3).unwrap();
        assert_eq!(plan, NextGame::Create(1));
    }

    #[test]
    fn running_game_is_returned_as_is() {
        let games = [slot(1, GameStatus::Completed), slot(2, GameStatus::Inprogress)];
        let plan = plan_next_game(EventStatus::Inprogress, &games, 3).unwrap();
        assert_eq!(plan, NextGame::AlreadyRunning(Uuid::from_u128(2)));
    }

    #[test]
    fn pending_last_game_is_started() {
        let games = [slot(1, GameStatus::Completed), slot(2, GameStatus::Pending)];
        let plan = plan_next_game(EventStatus::Inprogress, &games, 3).unwrap();
        assert_eq!(plan, NextGame::StartPending(Uuid::from_u128(2)));
    }

    #[test]
    fn next_number_follows_last_completed_game() {
        let games = [slot(1, GameStatus::Completed), slot(2, GameStatus::Completed)];
        let plan = plan_next_game(EventStatus::Inprogress, &games, 3).unwrap();
        assert_eq!(plan, NextGame::Create(3));
    }

    #[test]
    fn refuses_to_go_past_the_plan() {
        let games = [slot(1, GameStatus::Completed), slot(2, GameStatus::Completed)];
        let err = plan_next_game(EventStatus::Inprogress, &games, 2).unwrap_err();
        assert!(matches!(err, StorageError::InvalidState(_)));
    }

    #[test]
    fn closed_or_paused_events_cannot_start_games() {
        for status in [EventStatus::Completed, EventStatus::Cancelled, EventStatus::Paused] {
            let err = plan_next_game(status, &[], 3).unwrap_err();
            assert!(matches!(err, StorageError::InvalidState(_)), "{status}");
        }
    }

    #[test]
    fn event_completes_exactly_at_the_planned_count() {
        assert!(!plan_is_exhausted(2, 3));
        assert!(plan_is_exhausted(3, 3));
        assert!(plan_is_exhausted(4, 3));
    }

    fn completion(completed_games: i64) -> Completion {
        Completion {
            completed_games,
            planned: 3,
            top1_solo_ends_event: false,
            solo_winner: None,
            manual_winner: None,
        }
    }

    #[test]
    fn event_continues_until_the_last_planned_game() {
        assert_eq!(finish(&completion(1)), Ending::Continue);
        assert_eq!(finish(&completion(2)), Ending::Continue);
        assert!(!finish(&completion(2)).is_over());

        let last = finish(&completion(3));
        assert_eq!(last, Ending::FromStandings);
        assert!(last.is_over());
    }

    #[test]
    fn top1_solo_ends_the_event_early() {
        let solo = Uuid::from_u128(9);
        let early = Completion {
            top1_solo_ends_event: true,
            solo_winner: Some(solo),
            manual_winner: Some(Uuid::from_u128(1)),
            ..completion(1)
        };
        assert_eq!(finish(&early), Ending::Decided(solo));
    }

    #[test]
    fn top1_solo_is_ignored_when_the_event_disables_it() {
        let ignored = Completion {
            solo_winner: Some(Uuid::from_u128(9)),
            ..completion(1)
        };
        assert_eq!(finish(&ignored), Ending::Continue);
    }

    #[test]
    fn manual_winner_survives_the_last_game() {
        let manual = Uuid::from_u128(4);
        let last = Completion {
            manual_winner: Some(manual),
            ..completion(3)
        };
        assert_eq!(finish(&last), Ending::Decided(manual));
    }

    #[test]
    fn planned_count_cannot_strand_an_open_event() {
        assert!(check_planned_count(EventStatus::Pending, 0, 1).is_ok());
        assert!(check_planned_count(EventStatus::Inprogress, 2, 3).is_ok());

        for status in [EventStatus::Inprogress, EventStatus::Paused] {
            let err = check_planned_count(status, 2, 2).unwrap_err();
            assert!(matches!(err, StorageError::InvalidState(_)), "{status}");
            assert!(check_planned_count(status, 2, 1).is_err(), "{status}");
        }

        assert!(check_planned_count(EventStatus::Completed, 3, 3).is_ok());
        assert!(check_planned_count(EventStatus::Completed, 3, 2).is_err());
    }

    #[test]
    fn cancelled_events_freeze_stats() {
        assert!(ensure_stats_editable(EventStatus::Cancelled).is_err());
        for status in [
            EventStatus::Pending,
            EventStatus::Inprogress,
            EventStatus::Paused,
            EventStatus::Completed,
        ] {
            assert!(ensure_stats_editable(status).is_ok(), "{status}");
        }
    }

    #[test]
    fn pause_resume_and_cancel_transitions() {
        assert_eq!(
            transition(EventStatus::Inprogress, EventAction::Pause).unwrap(),
            EventStatus::Paused
        );
        assert_eq!(
            transition(EventStatus::Paused, EventAction::Resume).unwrap(),
            EventStatus::Inprogress
        );
        assert_eq!(
            transition(EventStatus::Pending, EventAction::Cancel).unwrap(),
            EventStatus::Cancelled
        );

        assert!(transition(EventStatus::Pending, EventAction::Pause).is_err());
        assert!(transition(EventStatus::Inprogress, EventAction::Resume).is_err());
        assert!(transition(EventStatus::Completed, EventAction::Cancel).is_err());
        assert!(transition(EventStatus::Cancelled, EventAction::Cancel).is_err());
    }

    #[test]
    fn multiplier_stays_neutral_when_disabled() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert_eq!(roll_kill_multiplier(false, &mut rng), Decimal::ONE);
        }
    }

    #[test]
    fn multiplier_draws_from_the_known_set() {
        let mut rng = StdRng::seed_from_u64(42);
        let rolls: Vec<Decimal> = (0..2000)
            .map(|_| roll_kill_multiplier(true, &mut rng))
            .collect();

        assert!(rolls.iter().all(|m| KILL_MULTIPLIERS.contains(m)));
        assert!(rolls.iter().any(|m| *m > Decimal::ONE));
        let boosted = rolls.iter().filter(|m| **m != Decimal::ONE).count();
        assert!(boosted < 400, "{boosted} boosted games out of 2000");
    }

    #[test]
    fn winner_prefers_score_then_deaths_then_name() {
        let standing = |id: u128, tag: &str, total, deaths| Standing {
            player_id: Uuid::from_u128(id),
            gamertag: tag.to_string(),
            total,
            deaths,
        };

        let standings = vec![
            standing(1, "Zed", dec!(12), 4),
            standing(2, "alpha", dec!(15), 9),
            standing(3, "Bravo", dec!(15), 3),
        ];
        assert_eq!(pick_winner(&standings), Some(Uuid::from_u128(3)));

        let tied = vec![standing(1, "charlie", dec!(5), 2), standing(2, "Bravo", dec!(5), 2)];
        assert_eq!(pick_winner(&tied), Some(Uuid::from_u128(2)));

        assert_eq!(pick_winner(&[]), None);
    }
}
