use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::player::UserId;
use crate::rng::{sample_indices, Rng};
use crate::words::WordBank;

/// 1-10 rounds, 30-180s per round. Validated by the router before it ever
/// reaches [`Game::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub total_rounds: u8,
    pub draw_time_secs: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            draw_time_secs: 60,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=10).contains(&self.total_rounds) {
            return Err("totalRounds must be between 1 and 10");
        }
        if !(30..=180).contains(&self.draw_time_secs) {
            return Err("drawTime must be between 30 and 180 seconds");
        }
        Ok(())
    }
}

/// A player as tracked by the game state machine — the score/guess-progress
/// half of a [`crate::player::User`]; see that type's docs for the split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePlayer {
    pub id: UserId,
    pub username: String,
    pub score: i64,
    pub has_guessed: bool,
}

/// One row of a sorted-by-score leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: UserId,
    pub username: String,
    pub score: i64,
}

/// Coarse phase derived from `isActive`/`isRoundActive`, for introspection
/// and the `gameState` snapshot sent to late joiners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    Idle,
    WaitingForWord,
    Drawing,
}

/// A round-start result, or notice that the game ended instead.
pub enum StartRoundOutcome {
    RoundStarted {
        drawer_id: UserId,
        word_options: Vec<String>,
        round: u8,
        total_rounds: u8,
    },
    GameEnded(GameEndOutcome),
}

#[derive(Debug, PartialEq, Eq)]
pub enum SelectWordError {
    RoundAlreadyActive,
    NotDrawer,
    WordNotOffered,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StartGameError {
    AlreadyActive,
}

pub struct SelectWordOutcome {
    pub word: String,
    pub masked_word: String,
    pub word_length: usize,
}

pub enum GuessOutcome {
    /// Not evaluated as a guess at all (no round active, or sender is the
    /// drawer) — the router should treat the message as plain chat.
    NotAGuess,
    /// Sender already appears in `guessedPlayers` this round.
    AlreadyGuessed,
    Wrong,
    Correct {
        points: i64,
        order: usize,
        /// True once every non-drawer player has guessed correctly this
        /// round — the router schedules `endRound` in 2s when this fires.
        all_guessed: bool,
    },
}

#[derive(Debug, Clone)]
pub struct RoundEndOutcome {
    pub word: Option<String>,
    pub scores: Vec<LeaderboardEntry>,
    pub should_end_game: bool,
}

#[derive(Debug, Clone)]
pub struct GameEndOutcome {
    pub winner: Option<LeaderboardEntry>,
    pub scores: Vec<LeaderboardEntry>,
}

/// Per-room round-progression, scoring, and hinting state machine.
/// Everything here is pure with respect to its [`Clock`]/[`Rng`]
/// parameters — no I/O, no sleeping; scheduling the timers this drives is
/// the caller's job.
#[derive(Debug, Clone)]
pub struct Game {
    total_rounds: u8,
    draw_time_secs: u32,
    is_active: bool,
    is_round_active: bool,
    current_round: u8,
    current_drawer_id: Option<UserId>,
    current_word: Option<String>,
    word_options: Vec<String>,
    used_words: Vec<String>,
    round_start: Option<std::time::Instant>,
    players: Vec<GamePlayer>,
    guessed_players: Vec<UserId>,
}

impl Default for Game {
    fn default() -> Self {
        let cfg = GameConfig::default();
        Self {
            total_rounds: cfg.total_rounds,
            draw_time_secs: cfg.draw_time_secs,
            is_active: false,
            is_round_active: false,
            current_round: 0,
            current_drawer_id: None,
            current_word: None,
            word_options: Vec::new(),
            used_words: Vec::new(),
            round_start: None,
            players: Vec::new(),
            guessed_players: Vec::new(),
        }
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> GameStatus {
        if !self.is_active {
            GameStatus::Idle
        } else if self.is_round_active {
            GameStatus::Drawing
        } else {
            GameStatus::WaitingForWord
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_round_active(&self) -> bool {
        self.is_round_active
    }

    pub fn current_round(&self) -> u8 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u8 {
        self.total_rounds
    }

    pub fn draw_time_secs(&self) -> u32 {
        self.draw_time_secs
    }

    pub fn current_drawer_id(&self) -> Option<UserId> {
        self.current_drawer_id
    }

    pub fn current_word(&self) -> Option<&str> {
        self.current_word.as_deref()
    }

    pub fn word_options(&self) -> &[String] {
        &self.word_options
    }

    pub fn used_words(&self) -> &[String] {
        &self.used_words
    }

    pub fn players(&self) -> &[GamePlayer] {
        &self.players
    }

    pub fn is_member(&self, id: UserId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    /// A round is in flight — `WaitingForWord` or `Drawing` — and hence a
    /// drawer exists who could disconnect mid-round.
    pub fn has_round_in_flight(&self) -> bool {
        self.is_active && self.current_round >= 1 && self.current_round <= self.total_rounds
    }

    /// True while `isRoundActive` and `userId` is not the drawer — the
    /// condition under which `chat-message` is adjudicated as a guess.
    pub fn is_guess_context(&self, user_id: UserId) -> bool {
        self.is_round_active && self.current_drawer_id != Some(user_id)
    }

    /// Idempotent: a duplicate id is a no-op, matching `join-room` for a
    /// user already present.
    pub fn add_player(&mut self, id: UserId, username: String) {
        if self.is_member(id) {
            return;
        }
        self.players.push(GamePlayer {
            id,
            username,
            score: 0,
            has_guessed: false,
        });
    }

    /// Removes the player and reports whether they were the current drawer.
    pub fn remove_player(&mut self, id: UserId) -> bool {
        let was_drawer = self.current_drawer_id == Some(id);
        self.players.retain(|p| p.id != id);
        self.guessed_players.retain(|g| *g != id);
        was_drawer
    }

    /// Resets round/score bookkeeping and marks the game active. A no-op
    /// error (not a panic) if a game is already running — `start-game` on
    /// an already-active game must be a no-op per the router contract.
    pub fn start(&mut self, config: GameConfig) -> Result<(), StartGameError> {
        if self.is_active {
            return Err(StartGameError::AlreadyActive);
        }
        self.total_rounds = config.total_rounds;
        self.draw_time_secs = config.draw_time_secs;
        self.is_active = true;
        self.is_round_active = false;
        self.current_round = 0;
        self.current_drawer_id = None;
        self.current_word = None;
        self.word_options.clear();
        self.used_words.clear();
        self.guessed_players.clear();
        for p in &mut self.players {
            p.score = 0;
            p.has_guessed = false;
        }
        Ok(())
    }

    /// `Idle -> WaitingForWord`, or ends the game if rounds are exhausted
    /// or the word bank is. Drawer is chosen by strict round-robin over
    /// `players` in insertion order at the moment this runs.
    pub fn start_round(&mut self, word_bank: &WordBank, rng: &mut dyn Rng) -> StartRoundOutcome {
        self.current_round += 1;

        if self.current_round > self.total_rounds || self.players.is_empty() {
            return StartRoundOutcome::GameEnded(self.end_game());
        }

        let used: HashSet<String> = self.used_words.iter().cloned().collect();
        let options = word_bank.pick_unused(3, &used, rng);
        if options.is_empty() {
            return StartRoundOutcome::GameEnded(self.end_game());
        }

        let drawer_index = (self.current_round as usize - 1) % self.players.len();
        let drawer_id = self.players[drawer_index].id;

        self.current_drawer_id = Some(drawer_id);
        self.current_word = None;
        self.word_options = options.clone();
        self.guessed_players.clear();
        self.is_round_active = false;
        for p in &mut self.players {
            p.has_guessed = false;
        }

        StartRoundOutcome::RoundStarted {
            drawer_id,
            word_options: options,
            round: self.current_round,
            total_rounds: self.total_rounds,
        }
    }

    /// `WaitingForWord -> Drawing`. Rejects a second `select-word` while a
    /// round is already active, per the strict double-fire guard.
    pub fn select_word(
        &mut self,
        user_id: UserId,
        word: &str,
        clock: &dyn Clock,
    ) -> Result<SelectWordOutcome, SelectWordError> {
        if self.is_round_active {
            return Err(SelectWordError::RoundAlreadyActive);
        }
        if self.current_drawer_id != Some(user_id) {
            return Err(SelectWordError::NotDrawer);
        }
        if !self.word_options.iter().any(|w| w == word) {
            return Err(SelectWordError::WordNotOffered);
        }

        self.current_word = Some(word.to_string());
        self.used_words.push(word.to_string());
        self.round_start = Some(clock.now());
        self.is_round_active = true;

        Ok(SelectWordOutcome {
            word: word.to_string(),
            masked_word: mask_word(word),
            word_length: word.chars().count(),
        })
    }

    /// Evaluates a chat message as a guess. Callers must check
    /// [`Game::is_guess_context`] first; this still returns `NotAGuess`
    /// defensively if called outside that context.
    pub fn submit_guess(&mut self, user_id: UserId, text: &str, clock: &dyn Clock) -> GuessOutcome {
        if !self.is_guess_context(user_id) {
            return GuessOutcome::NotAGuess;
        }
        if self.guessed_players.contains(&user_id) {
            return GuessOutcome::AlreadyGuessed;
        }
        let Some(word) = self.current_word.as_deref() else {
            return GuessOutcome::Wrong;
        };
        if text.trim().to_lowercase() != word.trim().to_lowercase() {
            return GuessOutcome::Wrong;
        }

        let order = self.guessed_players.len() + 1;
        let base = match order {
            1 => 100,
            2 => 75,
            3 => 50,
            _ => 25,
        };
        let elapsed = self
            .round_start
            .map(|start| clock.now().saturating_duration_since(start).as_secs() as i64)
            .unwrap_or(0);
        let time_bonus = (self.draw_time_secs as i64 - elapsed).max(0) / 2;
        let points = base + time_bonus;

        self.guessed_players.push(user_id);
        if let Some(player) = self.players.iter_mut().find(|p| p.id == user_id) {
            player.has_guessed = true;
            player.score += points;
        }
        if let Some(drawer_id) = self.current_drawer_id {
            if let Some(drawer) = self.players.iter_mut().find(|p| p.id == drawer_id) {
                drawer.score += 25;
            }
        }

        let non_drawer_count = self
            .players
            .iter()
            .filter(|p| Some(p.id) != self.current_drawer_id)
            .count();
        let all_guessed = self.guessed_players.len() >= non_drawer_count;

        GuessOutcome::Correct {
            points,
            order,
            all_guessed,
        }
    }

    /// Reveals `n` fresh, independently-sampled character positions of the
    /// current word. Returns `None` if no round is active.
    pub fn hint(&self, n: usize, rng: &mut dyn Rng) -> Option<String> {
        let word = self.current_word.as_deref()?;
        if !self.is_round_active {
            return None;
        }
        Some(hint_word(word, n, rng))
    }

    pub fn masked_current_word(&self) -> Option<String> {
        self.current_word.as_deref().map(mask_word)
    }

    /// The manual `end-round` event / scheduled round-end timer. No-op
    /// while `isRoundActive` is false, per the idempotence contract.
    pub fn end_round(&mut self) -> Option<RoundEndOutcome> {
        if !self.is_round_active {
            return None;
        }
        Some(self.finish_round())
    }

    /// The drawer-disconnect path: ends the round even mid-`WaitingForWord`
    /// (i.e. before a word was ever selected), unlike the manual path.
    pub fn end_round_for_drawer_departure(&mut self) -> Option<RoundEndOutcome> {
        if !self.has_round_in_flight() {
            return None;
        }
        Some(self.finish_round())
    }

    fn finish_round(&mut self) -> RoundEndOutcome {
        let word = self.current_word.take();
        self.word_options.clear();
        self.is_round_active = false;
        self.current_drawer_id = None;
        let should_end_game = self.current_round >= self.total_rounds;
        RoundEndOutcome {
            word,
            scores: self.leaderboard(),
            should_end_game,
        }
    }

    /// `any -> Idle`. Resets round counters so a fresh `start-game` begins
    /// cleanly.
    pub fn end_game(&mut self) -> GameEndOutcome {
        self.is_active = false;
        self.is_round_active = false;
        self.current_round = 0;
        self.current_drawer_id = None;
        self.current_word = None;
        self.word_options.clear();

        let scores = self.leaderboard();
        let winner = scores.first().cloned();
        GameEndOutcome { winner, scores }
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .players
            .iter()
            .map(|p| LeaderboardEntry {
                id: p.id,
                username: p.username.clone(),
                score: p.score,
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries
    }
}

/// Every character rendered as `_`, separated by single spaces; whitespace
/// and punctuation already in the word are preserved unmasked (the current
/// word bank contains none, but this keeps the function honest for any
/// future entries that might).
pub fn mask_word(word: &str) -> String {
    word.chars()
        .map(|c| if is_maskable(c) { '_' } else { c })
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn hint_word(word: &str, n: usize, rng: &mut dyn Rng) -> String {
    let chars: Vec<char> = word.chars().collect();
    let maskable: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| is_maskable(**c))
        .map(|(i, _)| i)
        .collect();

    let reveal_count = n.min(maskable.len());
    let revealed: HashSet<usize> = sample_indices(rng, maskable.len(), reveal_count)
        .into_iter()
        .map(|i| maskable[i])
        .collect();

    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if is_maskable(*c) && !revealed.contains(&i) { '_' } else { *c })
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_maskable(c: char) -> bool {
    !c.is_whitespace() && !c.is_ascii_punctuation()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::FakeClock;
    use crate::rng::test_support::SeededRng;
    use std::time::Duration;

    fn game_with_players(n: usize) -> Game {
        let mut game = Game::new();
        for i in 0..n {
            game.add_player(UserId::from_u128(i as u128 + 1), format!("p{i}"));
        }
        game
    }

    #[test]
    fn mask_word_replaces_every_letter() {
        assert_eq!(mask_word("apple"), "_ _ _ _ _");
    }

    #[test]
    fn hint_reveals_exactly_n_positions() {
        let mut rng = SeededRng::new(42);
        let hint = hint_word("apple", 2, &mut rng);
        let revealed = hint.split(' ').filter(|s| *s != "_").count();
        assert_eq!(revealed, 2);
    }

    #[test]
    fn add_player_is_idempotent() {
        let mut game = Game::new();
        let id = UserId::from_u128(1);
        game.add_player(id, "a".into());
        game.add_player(id, "a-dup".into());
        assert_eq!(game.players().len(), 1);
        assert_eq!(game.players()[0].username, "a");
    }

    #[test]
    fn start_on_already_active_game_is_rejected() {
        let mut game = game_with_players(2);
        game.start(GameConfig::default()).unwrap();
        assert_eq!(game.start(GameConfig::default()), Err(StartGameError::AlreadyActive));
    }

    #[test]
    fn drawer_rotation_follows_round_robin_over_insertion_order() {
        let bank = WordBank::new();
        let mut rng = SeededRng::new(1);
        let mut game = game_with_players(3);
        game.start(GameConfig {
            total_rounds: 5,
            draw_time_secs: 60,
        })
        .unwrap();

        let ids: Vec<UserId> = game.players().iter().map(|p| p.id).collect();
        for round in 1..=5u8 {
            match game.start_round(&bank, &mut rng) {
                StartRoundOutcome::RoundStarted { drawer_id, .. } => {
                    let expected = ids[(round as usize - 1) % ids.len()];
                    assert_eq!(drawer_id, expected, "round {round}");
                    // select a word so endRound can progress the game in
                    // a later test without re-deriving this sequence.
                    let word = game.word_options()[0].clone();
                    let clock = crate::clock::SystemClock;
                    game.select_word(drawer_id, &word, &clock).unwrap();
                    game.end_round().unwrap();
                }
                StartRoundOutcome::GameEnded(_) => panic!("game ended early at round {round}"),
            }
        }
    }

    #[test]
    fn used_words_never_repeat_across_a_game() {
        let bank = WordBank::new();
        let mut rng = SeededRng::new(9);
        let mut game = game_with_players(2);
        game.start(GameConfig {
            total_rounds: 5,
            draw_time_secs: 60,
        })
        .unwrap();

        for _ in 0..5 {
            let StartRoundOutcome::RoundStarted { drawer_id, .. } = game.start_round(&bank, &mut rng) else {
                panic!("unexpected game end");
            };
            let word = game.word_options()[0].clone();
            let clock = crate::clock::SystemClock;
            game.select_word(drawer_id, &word, &clock).unwrap();
            assert_eq!(game.used_words().len(), game.current_round() as usize);
            game.end_round().unwrap();
        }
        let unique: HashSet<_> = game.used_words().iter().collect();
        assert_eq!(unique.len(), game.used_words().len());
    }

    #[test]
    fn correct_guess_awards_order_based_score_and_drawer_bonus() {
        let bank = WordBank::new();
        let mut rng = SeededRng::new(5);
        let mut game = game_with_players(2);
        game.start(GameConfig {
            total_rounds: 1,
            draw_time_secs: 60,
        })
        .unwrap();

        let StartRoundOutcome::RoundStarted { drawer_id, .. } = game.start_round(&bank, &mut rng) else {
            panic!("expected round start");
        };
        let guesser_id = game.players().iter().find(|p| p.id != drawer_id).unwrap().id;
        let word = game.word_options()[0].clone();

        let clock = FakeClock::new();
        game.select_word(drawer_id, &word, &clock).unwrap();
        clock.advance(Duration::from_secs(10));

        match game.submit_guess(guesser_id, &word.to_uppercase(), &clock) {
            GuessOutcome::Correct { points, order, all_guessed } => {
                assert_eq!(order, 1);
                assert_eq!(points, 100 + (60 - 10) / 2);
                assert!(all_guessed);
            }
            _ => panic!("expected a correct guess"),
        }

        let drawer_score = game.players().iter().find(|p| p.id == drawer_id).unwrap().score;
        assert_eq!(drawer_score, 25);
    }

    #[test]
    fn guessing_twice_in_the_same_round_is_rejected() {
        let bank = WordBank::new();
        let mut rng = SeededRng::new(3);
        let mut game = game_with_players(2);
        game.start(GameConfig {
            total_rounds: 1,
            draw_time_secs: 60,
        })
        .unwrap();
        let StartRoundOutcome::RoundStarted { drawer_id, .. } = game.start_round(&bank, &mut rng) else {
            panic!("expected round start");
        };
        let guesser_id = game.players().iter().find(|p| p.id != drawer_id).unwrap().id;
        let word = game.word_options()[0].clone();
        let clock = FakeClock::new();
        game.select_word(drawer_id, &word, &clock).unwrap();

        assert!(matches!(
            game.submit_guess(guesser_id, &word, &clock),
            GuessOutcome::Correct { .. }
        ));
        assert!(matches!(
            game.submit_guess(guesser_id, &word, &clock),
            GuessOutcome::AlreadyGuessed
        ));
    }

    #[test]
    fn drawer_never_enters_guess_context() {
        let bank = WordBank::new();
        let mut rng = SeededRng::new(11);
        let mut game = game_with_players(2);
        game.start(GameConfig::default()).unwrap();
        let StartRoundOutcome::RoundStarted { drawer_id, .. } = game.start_round(&bank, &mut rng) else {
            panic!("expected round start");
        };
        let word = game.word_options()[0].clone();
        let clock = FakeClock::new();
        game.select_word(drawer_id, &word, &clock).unwrap();
        assert!(!game.is_guess_context(drawer_id));
    }

    #[test]
    fn second_select_word_while_round_active_is_rejected() {
        let bank = WordBank::new();
        let mut rng = SeededRng::new(13);
        let mut game = game_with_players(2);
        game.start(GameConfig::default()).unwrap();
        let StartRoundOutcome::RoundStarted { drawer_id, .. } = game.start_round(&bank, &mut rng) else {
            panic!("expected round start");
        };
        let word = game.word_options()[0].clone();
        let other = game.word_options()[1].clone();
        let clock = FakeClock::new();
        game.select_word(drawer_id, &word, &clock).unwrap();
        assert_eq!(
            game.select_word(drawer_id, &other, &clock),
            Err(SelectWordError::RoundAlreadyActive)
        );
    }

    #[test]
    fn end_round_while_inactive_is_a_no_op() {
        let mut game = game_with_players(2);
        game.start(GameConfig::default()).unwrap();
        assert!(game.end_round().is_none());
    }

    #[test]
    fn drawer_departure_ends_round_even_while_waiting_for_word() {
        let bank = WordBank::new();
        let mut rng = SeededRng::new(21);
        let mut game = game_with_players(2);
        game.start(GameConfig::default()).unwrap();
        game.start_round(&bank, &mut rng);
        assert!(!game.is_round_active());
        let outcome = game.end_round_for_drawer_departure();
        assert!(outcome.is_some());
        assert!(outcome.unwrap().word.is_none());
    }

    #[test]
    fn game_end_picks_highest_scorer_as_winner() {
        let bank = WordBank::new();
        let mut rng = SeededRng::new(2);
        let mut game = game_with_players(2);
        game.start(GameConfig {
            total_rounds: 1,
            draw_time_secs: 60,
        })
        .unwrap();
        let StartRoundOutcome::RoundStarted { drawer_id, .. } = game.start_round(&bank, &mut rng) else {
            panic!("expected round start");
        };
        let guesser_id = game.players().iter().find(|p| p.id != drawer_id).unwrap().id;
        let word = game.word_options()[0].clone();
        let clock = FakeClock::new();
        game.select_word(drawer_id, &word, &clock).unwrap();
        game.submit_guess(guesser_id, &word, &clock);
        game.end_round().unwrap();

        let end = game.end_game();
        assert_eq!(end.winner.unwrap().id, guesser_id);
        assert!(!game.is_active());
    }

    #[test]
    fn single_player_game_starts_with_no_guessers() {
        let bank = WordBank::new();
        let mut rng = SeededRng::new(4);
        let mut game = game_with_players(1);
        game.start(GameConfig::default()).unwrap();
        let StartRoundOutcome::RoundStarted { drawer_id, .. } = game.start_round(&bank, &mut rng) else {
            panic!("expected round start");
        };
        assert_eq!(game.players().len(), 1);
        assert_eq!(drawer_id, game.players()[0].id);
    }
}
