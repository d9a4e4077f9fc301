pub mod clock;
pub mod drawing;
pub mod game;
pub mod net;
pub mod player;
pub mod rng;
pub mod room;
pub mod time;
pub mod words;
