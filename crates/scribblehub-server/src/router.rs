use std::sync::Arc;
use std::time::Duration;

use scribblehub_core::clock::SystemClock;
use scribblehub_core::drawing::StrokeData;
use scribblehub_core::game::{GameConfig, GameEndOutcome, GuessOutcome, RoundEndOutcome, StartRoundOutcome};
use scribblehub_core::net::messages::{ClientEvent, GameStateView, ServerEvent, StartGameSettings, UserView};
use scribblehub_core::player::{User, UserId};
use scribblehub_core::rng::ThreadRng;
use scribblehub_core::room::{Room, RoomId};
use scribblehub_core::time::epoch_millis;
use scribblehub_core::words::WordBank;

use crate::room_manager::{OutboundSender, RoomRegistry};
use crate::state::AppState;

/// Delay between `start-game`/`round-ended` and the next `round-started-*`.
const START_ROUND_DELAY: Duration = Duration::from_secs(3);
/// Delay between `round-ended` and the next `round-started-*` or `game-ended`.
const INTER_ROUND_DELAY: Duration = Duration::from_secs(5);
/// Delay once every guesser has guessed correctly, superseding whatever
/// drawTime remained on the round's original `end-round` timer.
const ALL_GUESSED_DELAY: Duration = Duration::from_secs(2);

/// The session router: turns decoded [`ClientEvent`]s into state mutations
/// and the outbound broadcasts they produce, and owns the scheduling of the
/// delayed transitions (round start, round end, game end) that drive the
/// game forward between client messages.
///
/// Cheap to clone — everything inside is shared via `AppState`.
#[derive(Clone)]
pub struct Router {
    state: AppState,
    word_bank: Arc<WordBank>,
}

impl Router {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            word_bank: Arc::new(WordBank::new()),
        }
    }

    /// Registers a freshly-accepted connection's outbound channel. Must run
    /// before any event from that connection is dispatched.
    pub async fn connect(&self, conn_id: UserId, sender: OutboundSender) {
        let mut rooms = self.state.rooms.write().await;
        rooms.register_connection(conn_id, sender);
    }

    pub async fn dispatch(&self, conn_id: UserId, event: ClientEvent) {
        match event {
            ClientEvent::CreateRoom { room_name, username } => {
                self.handle_create_room(conn_id, room_name, username).await
            },
            ClientEvent::JoinRoom { room_id, username } => self.handle_join_room(conn_id, room_id, username).await,
            ClientEvent::Drawing { room_id, drawing_data } => {
                self.handle_drawing(conn_id, room_id, drawing_data).await
            },
            ClientEvent::ClearCanvas { room_id } => self.handle_clear_canvas(conn_id, room_id).await,
            ClientEvent::ChatMessage { room_id, message } => {
                self.handle_chat_message(conn_id, room_id, message).await
            },
            ClientEvent::StartGame { room_id, settings } => self.handle_start_game(conn_id, room_id, settings).await,
            ClientEvent::SelectWord { room_id, word } => self.handle_select_word(conn_id, room_id, word).await,
            ClientEvent::RequestHint { room_id } => self.handle_request_hint(conn_id, room_id).await,
            ClientEvent::EndRound { room_id } => self.handle_end_round_event(conn_id, room_id).await,
        }
    }

    async fn emit_error(&self, conn_id: UserId, message: &str) {
        let rooms = self.state.rooms.read().await;
        rooms.emit_to_one(conn_id, &ServerEvent::Error { error: message.to_string() });
    }

    async fn handle_create_room(&self, conn_id: UserId, room_name: String, username: String) {
        if room_name.trim().is_empty() || username.trim().is_empty() {
            self.emit_error(conn_id, "roomName and username are required").await;
            return;
        }

        let mut rng = ThreadRng;
        let user = User::new(conn_id, username.clone(), &mut rng);

        let mut rooms = self.state.rooms.write().await;
        let room_id = rooms.create_room(room_name.clone());
        let room = rooms.room_mut(room_id).expect("just created");
        room.add_user(user.clone());
        room.game.add_player(conn_id, username.clone());
        rooms.join(room_id, conn_id);

        rooms.emit_to_one(
            conn_id,
            &ServerEvent::RoomCreated {
                room_id,
                room_name,
                user: UserView::from(&user),
            },
        );

        tracing::info!(%room_id, %conn_id, "room created");
    }

    async fn handle_join_room(&self, conn_id: UserId, room_id: RoomId, username: String) {
        if username.trim().is_empty() {
            self.emit_error(conn_id, "username is required").await;
            return;
        }

        let mut rng = ThreadRng;
        let mut rooms = self.state.rooms.write().await;
        if rooms.room(room_id).is_none() {
            drop(rooms);
            self.emit_error(conn_id, "room not found").await;
            return;
        }

        let room = rooms.room_mut(room_id).expect("checked above");
        let user = match room.user(conn_id) {
            Some(existing) => existing.clone(),
            None => User::new(conn_id, username, &mut rng),
        };
        room.add_user(user.clone());
        room.game.add_player(conn_id, user.username.clone());
        rooms.join(room_id, conn_id);

        let room = rooms.room(room_id).expect("still present");
        let room_name = room.name.clone();
        let users: Vec<UserView> = room.users().iter().map(UserView::from).collect();
        let drawing_data = room.drawing_log.events().to_vec();
        let game_state = game_state_view(room);

        rooms.emit_to_one(
            conn_id,
            &ServerEvent::RoomJoined {
                room_id,
                room_name,
                user: UserView::from(&user),
                users,
                drawing_data,
                game_state,
            },
        );
        rooms.broadcast_to_room(room_id, &ServerEvent::UserJoined { user: UserView::from(&user) }, Some(conn_id));

        tracing::info!(%room_id, %conn_id, "user joined room");
    }

    async fn handle_drawing(&self, conn_id: UserId, room_id: RoomId, drawing_data: StrokeData) {
        let mut rooms = self.state.rooms.write().await;
        let Some(room) = rooms.room_mut(room_id) else {
            return;
        };
        if !room.is_member(conn_id) {
            return;
        }
        if room.game.is_round_active() && room.game.current_drawer_id() != Some(conn_id) {
            tracing::debug!(%room_id, %conn_id, "drawing dropped: sender is not the current drawer");
            return;
        }

        let timestamp = epoch_millis();
        room.drawing_log.append(drawing_data.clone(), conn_id, timestamp);
        rooms.broadcast_to_room(
            room_id,
            &ServerEvent::Drawing { drawing_data, user_id: conn_id },
            Some(conn_id),
        );
    }

    async fn handle_clear_canvas(&self, conn_id: UserId, room_id: RoomId) {
        let mut rooms = self.state.rooms.write().await;
        let Some(room) = rooms.room_mut(room_id) else {
            return;
        };
        if !room.is_member(conn_id) {
            return;
        }
        room.drawing_log.clear();
        rooms.broadcast_to_room(room_id, &ServerEvent::CanvasCleared {}, None);
    }

    async fn handle_chat_message(&self, conn_id: UserId, room_id: RoomId, message: String) {
        let mut rooms = self.state.rooms.write().await;
        let Some(room) = rooms.room_mut(room_id) else {
            return;
        };
        let Some(sender) = room.user(conn_id).cloned() else {
            return;
        };

        let is_guess_context = room.game.is_guess_context(conn_id);
        if is_guess_context {
            // Checked independently of `submit_guess`'s own comparison so a
            // repeat of the secret word from someone who already guessed
            // correctly this round (AlreadyGuessed) is still recognized and
            // never falls through to the plain chat broadcast below.
            let matches_current_word = room
                .game
                .current_word()
                .map(|w| message.trim().to_lowercase() == w.trim().to_lowercase())
                .unwrap_or(false);

            let clock = SystemClock;
            match room.game.submit_guess(conn_id, &message, &clock) {
                GuessOutcome::Correct { points, all_guessed, .. } => {
                    let word = room.game.current_word().map(str::to_string);
                    let leaderboard = room.game.leaderboard();

                    rooms.broadcast_to_room(
                        room_id,
                        &ServerEvent::CorrectGuess {
                            player: UserView::from(&sender),
                            points,
                            word: None,
                        },
                        Some(conn_id),
                    );
                    rooms.emit_to_one(
                        conn_id,
                        &ServerEvent::CorrectGuess {
                            player: UserView::from(&sender),
                            points,
                            word,
                        },
                    );
                    rooms.broadcast_to_room(room_id, &ServerEvent::LeaderboardUpdate { leaderboard }, None);

                    if all_guessed {
                        self.schedule_round_end(&mut rooms, room_id, ALL_GUESSED_DELAY);
                    }
                    return;
                },
                GuessOutcome::AlreadyGuessed if matches_current_word => {
                    // The secret word itself must never be echoed as chat,
                    // even from a player who already guessed it this round.
                    return;
                },
                _ => {},
            }
        }

        rooms.broadcast_to_room(
            room_id,
            &ServerEvent::ChatMessage {
                user: UserView::from(&sender),
                message,
                timestamp: epoch_millis(),
                is_guess: is_guess_context,
            },
            None,
        );
    }

    async fn handle_start_game(&self, conn_id: UserId, room_id: RoomId, settings: StartGameSettings) {
        let config = GameConfig {
            total_rounds: settings.rounds,
            draw_time_secs: settings.draw_time,
        };
        if config.validate().is_err() {
            tracing::debug!(%room_id, %conn_id, "start-game rejected: settings out of range");
            return;
        }

        let mut rooms = self.state.rooms.write().await;
        let Some(room) = rooms.room_mut(room_id) else {
            return;
        };
        if !room.is_member(conn_id) {
            return;
        }
        if room.game.start(config).is_err() {
            tracing::debug!(%room_id, "start-game ignored: game already active");
            return;
        }
        room.drawing_log.clear();

        rooms.broadcast_to_room(room_id, &ServerEvent::CanvasCleared {}, None);
        rooms.broadcast_to_room(
            room_id,
            &ServerEvent::GameStarted {
                rounds: settings.rounds,
                draw_time: settings.draw_time,
            },
            None,
        );

        self.schedule_start_round(&mut rooms, room_id, START_ROUND_DELAY);
        tracing::info!(%room_id, %conn_id, "game started");
    }

    async fn handle_select_word(&self, conn_id: UserId, room_id: RoomId, word: String) {
        let mut rooms = self.state.rooms.write().await;
        let Some(room) = rooms.room_mut(room_id) else {
            return;
        };
        if !room.is_member(conn_id) {
            return;
        }

        let clock = SystemClock;
        let outcome = room.game.select_word(conn_id, &word, &clock);
        let draw_time = room.game.draw_time_secs();

        match outcome {
            Ok(result) => {
                rooms.emit_to_one(conn_id, &ServerEvent::WordSelectedDrawer { word: result.word });
                rooms.broadcast_to_room(
                    room_id,
                    &ServerEvent::WordSelectedGuesser {
                        masked_word: result.masked_word,
                        word_length: result.word_length,
                    },
                    Some(conn_id),
                );
                self.schedule_round_end(&mut rooms, room_id, Duration::from_secs(draw_time as u64));
            },
            Err(e) => {
                tracing::debug!(%room_id, %conn_id, error = ?e, "select-word rejected");
            },
        }
    }

    async fn handle_request_hint(&self, conn_id: UserId, room_id: RoomId) {
        let mut rng = ThreadRng;
        let rooms = self.state.rooms.read().await;
        let Some(room) = rooms.room(room_id) else {
            return;
        };
        if !room.is_member(conn_id) {
            return;
        }
        let Some(hint) = room.game.hint(1, &mut rng) else {
            return;
        };
        let Some(drawer_id) = room.game.current_drawer_id() else {
            return;
        };
        rooms.broadcast_to_room(room_id, &ServerEvent::HintRevealed { hint }, Some(drawer_id));
    }

    async fn handle_end_round_event(&self, conn_id: UserId, room_id: RoomId) {
        let mut rooms = self.state.rooms.write().await;
        let is_member = rooms.room(room_id).map(|r| r.is_member(conn_id)).unwrap_or(false);
        if !is_member {
            return;
        }

        let outcome = {
            let Some(room) = rooms.room_mut(room_id) else {
                return;
            };
            room.game.end_round()
        };
        if let Some(outcome) = outcome {
            self.finish_round(&mut rooms, room_id, outcome);
        }
    }

    /// Cleans up a departed connection: membership, game-player state, the
    /// resulting broadcast, a forced round end if the departing player was
    /// drawing, and finally the room itself once it is empty.
    pub async fn disconnect(&self, conn_id: UserId) {
        let mut rooms = self.state.rooms.write().await;
        rooms.unregister_connection(conn_id);

        let Some(room_id) = rooms.leave(conn_id) else {
            return;
        };

        let removed = {
            let Some(room) = rooms.room_mut(room_id) else {
                return;
            };
            let user = room.remove_user(conn_id);
            let was_drawer = room.game.remove_player(conn_id);
            user.map(|u| (u, was_drawer))
        };

        let Some((user, was_drawer)) = removed else {
            if rooms.room(room_id).map(|r| r.is_empty()).unwrap_or(false) {
                rooms.destroy_room(room_id);
            }
            return;
        };

        tracing::info!(%room_id, %conn_id, "user disconnected");
        rooms.broadcast_to_room(room_id, &ServerEvent::UserLeft { user: UserView::from(&user) }, None);

        if was_drawer {
            let outcome = rooms.room_mut(room_id).and_then(|room| room.game.end_round_for_drawer_departure());
            if let Some(outcome) = outcome {
                self.finish_round(&mut rooms, room_id, outcome);
            }
        }

        if rooms.room(room_id).map(|r| r.is_empty()).unwrap_or(false) {
            rooms.destroy_room(room_id);
        }
    }

    /// Shared tail of every path that ends a round: broadcast `round-ended`,
    /// then schedule whichever transition comes next.
    fn finish_round(&self, rooms: &mut RoomRegistry, room_id: RoomId, outcome: RoundEndOutcome) {
        rooms.broadcast_to_room(
            room_id,
            &ServerEvent::RoundEnded {
                word: outcome.word,
                scores: outcome.scores,
            },
            None,
        );
        if outcome.should_end_game {
            self.schedule_game_end(rooms, room_id, INTER_ROUND_DELAY);
        } else {
            self.schedule_start_round(rooms, room_id, INTER_ROUND_DELAY);
        }
    }

    fn schedule_start_round(&self, rooms: &mut RoomRegistry, room_id: RoomId, delay: Duration) {
        let router = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            router.fire_start_round(room_id).await;
        });
        rooms.set_timer(room_id, handle);
    }

    fn schedule_round_end(&self, rooms: &mut RoomRegistry, room_id: RoomId, delay: Duration) {
        let router = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            router.fire_round_end(room_id).await;
        });
        rooms.set_timer(room_id, handle);
    }

    fn schedule_game_end(&self, rooms: &mut RoomRegistry, room_id: RoomId, delay: Duration) {
        let router = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            router.fire_game_end(room_id).await;
        });
        rooms.set_timer(room_id, handle);
    }

    async fn fire_start_round(&self, room_id: RoomId) {
        let mut rng = ThreadRng;
        let mut rooms = self.state.rooms.write().await;

        let outcome = {
            let Some(room) = rooms.room_mut(room_id) else {
                return;
            };
            if !room.game.is_active() {
                return;
            }
            room.drawing_log.clear();
            room.game.start_round(&self.word_bank, &mut rng)
        };

        match outcome {
            StartRoundOutcome::RoundStarted { drawer_id, word_options, round, total_rounds } => {
                rooms.broadcast_to_room(room_id, &ServerEvent::CanvasCleared {}, None);

                let Some(drawer) = rooms.room(room_id).and_then(|r| r.user(drawer_id)).cloned() else {
                    return;
                };
                rooms.emit_to_one(
                    drawer_id,
                    &ServerEvent::RoundStartedDrawer {
                        drawer: UserView::from(&drawer),
                        word_options,
                        round,
                        total_rounds,
                    },
                );
                rooms.broadcast_to_room(
                    room_id,
                    &ServerEvent::RoundStartedGuesser {
                        drawer: UserView::from(&drawer),
                        round,
                        total_rounds,
                    },
                    Some(drawer_id),
                );
            },
            StartRoundOutcome::GameEnded(end) => emit_game_ended(&rooms, room_id, end),
        }
    }

    async fn fire_round_end(&self, room_id: RoomId) {
        let mut rooms = self.state.rooms.write().await;
        let outcome = {
            let Some(room) = rooms.room_mut(room_id) else {
                return;
            };
            room.game.end_round()
        };
        if let Some(outcome) = outcome {
            self.finish_round(&mut rooms, room_id, outcome);
        }
    }

    async fn fire_game_end(&self, room_id: RoomId) {
        let mut rooms = self.state.rooms.write().await;
        let end = {
            let Some(room) = rooms.room_mut(room_id) else {
                return;
            };
            room.game.end_game()
        };
        emit_game_ended(&rooms, room_id, end);
    }
}

fn emit_game_ended(rooms: &RoomRegistry, room_id: RoomId, end: GameEndOutcome) {
    rooms.broadcast_to_room(
        room_id,
        &ServerEvent::GameEnded {
            winner: end.winner,
            scores: end.scores,
        },
        None,
    );
}

fn game_state_view(room: &Room) -> GameStateView {
    let game = &room.game;
    GameStateView {
        status: game.status(),
        is_active: game.is_active(),
        current_round: game.current_round(),
        total_rounds: game.total_rounds(),
        draw_time: game.draw_time_secs(),
        current_drawer_id: game.current_drawer_id(),
        leaderboard: game.leaderboard(),
    }
}
