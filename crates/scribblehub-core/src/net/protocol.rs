use crate::net::messages::{ClientEvent, ServerEvent};

/// Maximum inbound frame size, enforced by the transport before a payload
/// ever reaches [`decode_client_event`].
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // 64 KiB

/// Parses a single inbound WebSocket text frame into a [`ClientEvent`].
/// Frames are plain JSON objects shaped `{"event": "...", "payload": {...}}`.
pub fn decode_client_event(text: &str) -> Result<ClientEvent, serde_json::Error> {
    serde_json::from_str(text)
}

/// Serializes an outbound event into the same envelope shape.
pub fn encode_server_event(event: &ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_create_room() {
        let frame = r#"{"event":"create-room","payload":{"roomName":"R","username":"alice"}}"#;
        let event = decode_client_event(frame).unwrap();
        match event {
            ClientEvent::CreateRoom { room_name, username } => {
                assert_eq!(room_name, "R");
                assert_eq!(username, "alice");
            }
            _ => panic!("wrong variant decoded"),
        }
    }

    #[test]
    fn rejects_unknown_event_name() {
        let frame = r#"{"event":"not-a-real-event","payload":{}}"#;
        assert!(decode_client_event(frame).is_err());
    }

    #[test]
    fn encodes_word_selected_with_a_shared_event_name() {
        let drawer = encode_server_event(&ServerEvent::WordSelectedDrawer { word: "apple".into() }).unwrap();
        let guesser = encode_server_event(&ServerEvent::WordSelectedGuesser {
            masked_word: "_ _ _ _ _".into(),
            word_length: 5,
        })
        .unwrap();
        assert!(drawer.contains(r#""event":"word-selected""#));
        assert!(guesser.contains(r#""event":"word-selected""#));
    }
}
