use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::drawing::{DrawingEvent, StrokeData};
use crate::game::{GameStatus, LeaderboardEntry};
use crate::player::{PlayerColor, User, UserId};

/// The `{rounds, drawTime}` settings payload of `start-game`, kept distinct
/// from [`crate::game::GameConfig`] so the wire field names (`rounds`) can
/// diverge from the internal ones (`total_rounds`) without either side
/// growing serde attributes it doesn't otherwise need.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StartGameSettings {
    pub rounds: u8,
    #[serde(rename = "drawTime")]
    pub draw_time: u32,
}

/// Every event a connected client may send, keyed by its `event` field with
/// the rest of the frame under `payload` — the `{event, payload}` envelope
/// this server's transport realizes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    CreateRoom { room_name: String, username: String },
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: Uuid, username: String },
    #[serde(rename_all = "camelCase")]
    Drawing {
        room_id: Uuid,
        drawing_data: StrokeData,
    },
    #[serde(rename_all = "camelCase")]
    ClearCanvas { room_id: Uuid },
    #[serde(rename_all = "camelCase")]
    ChatMessage { room_id: Uuid, message: String },
    #[serde(rename_all = "camelCase")]
    StartGame {
        room_id: Uuid,
        settings: StartGameSettings,
    },
    #[serde(rename_all = "camelCase")]
    SelectWord { room_id: Uuid, word: String },
    #[serde(rename_all = "camelCase")]
    RequestHint { room_id: Uuid },
    #[serde(rename_all = "camelCase")]
    EndRound { room_id: Uuid },
}

/// A light, serializable view of a [`User`] for outbound frames (identical
/// shape today, kept separate so wire-facing fields can drift from the
/// internal type without touching `player.rs`).
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub color: PlayerColor,
}

impl From<&User> for UserView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            color: u.color,
        }
    }
}

/// The `gameState` snapshot handed to a joiner — deliberately omits
/// `currentWord`/`wordOptions`, which are never sent to anyone but the
/// drawer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub status: GameStatus,
    pub is_active: bool,
    pub current_round: u8,
    pub total_rounds: u8,
    pub draw_time: u32,
    pub current_drawer_id: Option<UserId>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Every event the server may emit, tagged the same way as [`ClientEvent`]
/// so both directions share one framing convention.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: Uuid,
        room_name: String,
        user: UserView,
    },
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        room_id: Uuid,
        room_name: String,
        user: UserView,
        users: Vec<UserView>,
        drawing_data: Vec<DrawingEvent>,
        game_state: GameStateView,
    },
    #[serde(rename_all = "camelCase")]
    UserJoined { user: UserView },
    #[serde(rename_all = "camelCase")]
    UserLeft { user: UserView },
    #[serde(rename_all = "camelCase")]
    Drawing {
        drawing_data: StrokeData,
        user_id: UserId,
    },
    CanvasCleared {},
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        user: UserView,
        message: String,
        timestamp: u64,
        is_guess: bool,
    },
    #[serde(rename_all = "camelCase")]
    CorrectGuess {
        player: UserView,
        points: i64,
        word: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    LeaderboardUpdate {
        leaderboard: Vec<LeaderboardEntry>,
    },
    #[serde(rename_all = "camelCase")]
    HintRevealed { hint: String },
    #[serde(rename_all = "camelCase")]
    GameStarted { rounds: u8, draw_time: u32 },
    #[serde(rename_all = "camelCase")]
    RoundStartedDrawer {
        drawer: UserView,
        word_options: Vec<String>,
        round: u8,
        total_rounds: u8,
    },
    #[serde(rename_all = "camelCase")]
    RoundStartedGuesser {
        drawer: UserView,
        round: u8,
        total_rounds: u8,
    },
    // Both variants below are emitted under the same wire event name,
    // `word-selected` — the drawer and everyone else get different
    // payloads for the one logical event, so the tag is pinned explicitly
    // rather than left to derive from two distinct variant names.
    #[serde(rename = "word-selected")]
    #[serde(rename_all = "camelCase")]
    WordSelectedDrawer { word: String },
    #[serde(rename = "word-selected")]
    #[serde(rename_all = "camelCase")]
    WordSelectedGuesser {
        masked_word: String,
        word_length: usize,
    },
    #[serde(rename_all = "camelCase")]
    RoundEnded {
        word: Option<String>,
        scores: Vec<LeaderboardEntry>,
    },
    #[serde(rename_all = "camelCase")]
    GameEnded {
        winner: Option<LeaderboardEntry>,
        scores: Vec<LeaderboardEntry>,
    },
    Error { error: String },
}
