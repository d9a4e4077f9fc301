use serde::{Deserialize, Serialize};

use crate::player::UserId;

/// A single point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Whether a stroke adds or removes ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Draw,
    Erase,
}

/// The client-supplied portion of a drawing event, before the router stamps
/// on the author and arrival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeData {
    #[serde(rename = "type")]
    pub kind: StrokeKind,
    pub points: Vec<Point>,
    pub color: String,
    #[serde(rename = "lineWidth")]
    pub line_width: f64,
}

/// A stamped entry in a room's Drawing Log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingEvent {
    #[serde(flatten)]
    pub data: StrokeData,
    pub user_id: UserId,
    pub timestamp: u64,
}

/// Per-room append-only stroke history, replayed verbatim to late joiners.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawingLog {
    events: Vec<DrawingEvent>,
}

impl DrawingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, data: StrokeData, user_id: UserId, timestamp: u64) {
        self.events.push(DrawingEvent {
            data,
            user_id,
            timestamp,
        });
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[DrawingEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke() -> StrokeData {
        StrokeData {
            kind: StrokeKind::Draw,
            points: vec![Point { x: 0.0, y: 0.0 }, Point { x: 10.0, y: 10.0 }],
            color: "#000000".into(),
            line_width: 2.0,
        }
    }

    #[test]
    fn append_and_replay_reproduces_identical_content() {
        let mut log = DrawingLog::new();
        let user = UserId::new_v4();
        log.append(stroke(), user, 1_000);

        assert_eq!(log.events().len(), 1);
        let replayed = &log.events()[0];
        assert_eq!(replayed.data, stroke());
        assert_eq!(replayed.user_id, user);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = DrawingLog::new();
        log.append(stroke(), UserId::new_v4(), 1);
        log.clear();
        assert!(log.is_empty());
    }
}
