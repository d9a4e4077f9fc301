pub mod messages;
pub mod protocol;

pub use messages::{ClientEvent, ServerEvent};
pub use protocol::{decode_client_event, encode_server_event, MAX_MESSAGE_SIZE};
