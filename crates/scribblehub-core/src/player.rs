use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a connected session. Not persisted across reconnects — a
/// fresh socket always gets a fresh id.
pub type UserId = Uuid;

/// A session bound 1:1 to an active transport connection. Distinct from a
/// [`crate::game::GamePlayer`]: a `User` is room membership and chat
/// identity; a `GamePlayer` is the subset of that identity the game state
/// machine tracks score and guess progress for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub color: PlayerColor,
}

impl User {
    pub fn new(id: UserId, username: String, rng: &mut dyn crate::rng::Rng) -> Self {
        Self {
            id,
            username,
            color: PlayerColor::random(rng),
        }
    }
}

/// A hex color string (`"#rrggbb"`) drawn from a fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerColor(&'static str);

impl PlayerColor {
    /// Drawn with replacement at join time; collisions between two users in
    /// the same room are permitted by design, the palette is UI flavor, not
    /// an identity key.
    pub const PALETTE: &'static [&'static str] = &[
        "#e6194b", // red
        "#3cb44b", // green
        "#ffe119", // yellow
        "#4363d8", // blue
        "#f58231", // orange
        "#911eb4", // purple
        "#46f0f0", // cyan
        "#f032e6", // magenta
        "#bcf60c", // lime
        "#fabebe", // pink
        "#008080", // teal
        "#9a6324", // brown
    ];

    pub fn random(rng: &mut dyn crate::rng::Rng) -> Self {
        let idx = rng.gen_range(Self::PALETTE.len());
        Self(Self::PALETTE[idx])
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self(Self::PALETTE[0])
    }
}
