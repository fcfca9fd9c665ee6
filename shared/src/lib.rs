use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_PLAYERS: usize = 4;
pub const SERVER_PORT: u16 = 8080;
pub const TICK_RATE: u32 = 60;
pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;

pub const WELCOME_SIZE: usize = 2;
pub const INPUT_SIZE: usize = 15;
pub const PLAYER_STATE_SIZE: usize = 19;
pub const STATE_UPDATE_SIZE: usize = 1 + MAX_PLAYERS * PLAYER_STATE_SIZE;
pub const RESTART_REQUEST_SIZE: usize = 1;

/// Leading type tag of every message on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Welcome = 0,
    Input = 1,
    StateUpdate = 2,
    RestartRequest = 3,
}

impl MessageKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(MessageKind::Welcome),
            1 => Some(MessageKind::Input),
            2 => Some(MessageKind::StateUpdate),
            3 => Some(MessageKind::RestartRequest),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Total size on the wire, tag included.
    pub fn wire_size(self) -> usize {
        match self {
            MessageKind::Welcome => WELCOME_SIZE,
            MessageKind::Input => INPUT_SIZE,
            MessageKind::StateUpdate => STATE_UPDATE_SIZE,
            MessageKind::RestartRequest => RESTART_REQUEST_SIZE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty message")]
    Empty,
    #[error("unknown message type tag {0}")]
    UnknownKind(u8),
    #[error("truncated {kind:?} message: expected {expected} bytes, got {actual}")]
    Truncated {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Welcome {
    pub assigned_id: u8,
}

/// Per-tick intent submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Input {
    pub id: u8,
    /// Movement intent, nominally in -1.0..=1.0.
    pub dx: f32,
    pub dy: f32,
    /// Aim angle in radians.
    pub rotation: f32,
    pub attack: u8,
}

impl Input {
    pub fn new(id: u8, dx: f32, dy: f32, rotation: f32, attack: bool) -> Self {
        Self {
            id,
            dx,
            dy,
            rotation,
            attack: attack as u8,
        }
    }

    pub fn is_attacking(&self) -> bool {
        self.attack != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: u8,
    pub active: u8,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub score: u32,
    pub is_attacking: u8,
}

impl PlayerState {
    pub fn is_active(&self) -> bool {
        self.active != 0
    }
}

/// The full world snapshot, one entry per slot in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub players: [PlayerState; MAX_PLAYERS],
}

impl StateUpdate {
    pub fn empty() -> Self {
        let mut players = [PlayerState::default(); MAX_PLAYERS];
        for (i, player) in players.iter_mut().enumerate() {
            player.id = i as u8;
        }
        Self { players }
    }

    pub fn active_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.iter().filter(|p| p.is_active())
    }
}

/// Every message either end can put on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Welcome(Welcome),
    Input(Input),
    StateUpdate(StateUpdate),
    RestartRequest,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Welcome(_) => MessageKind::Welcome,
            Message::Input(_) => MessageKind::Input,
            Message::StateUpdate(_) => MessageKind::StateUpdate,
            Message::RestartRequest => MessageKind::RestartRequest,
        }
    }

    /// Encodes the message as tag byte followed by the packed body.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let kind = self.kind();
        let mut buf = Vec::with_capacity(kind.wire_size());
        buf.push(kind.tag());

        match self {
            Message::Welcome(body) => bincode::serialize_into(&mut buf, body)?,
            Message::Input(body) => bincode::serialize_into(&mut buf, body)?,
            Message::StateUpdate(body) => bincode::serialize_into(&mut buf, body)?,
            Message::RestartRequest => {}
        }

        debug_assert_eq!(buf.len(), kind.wire_size());
        Ok(buf)
    }

    /// Decodes one message from the front of `bytes`.
    ///
    /// The kind comes from the leading tag; the buffer must hold at least that
    /// kind's wire size. Bytes past the message are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Message, ProtocolError> {
        let tag = *bytes.first().ok_or(ProtocolError::Empty)?;
        let kind = MessageKind::from_tag(tag).ok_or(ProtocolError::UnknownKind(tag))?;

        let expected = kind.wire_size();
        if bytes.len() < expected {
            return Err(ProtocolError::Truncated {
                kind,
                expected,
                actual: bytes.len(),
            });
        }

        let body = &bytes[1..expected];
        let message = match kind {
            MessageKind::Welcome => Message::Welcome(bincode::deserialize(body)?),
            MessageKind::Input => Message::Input(bincode::deserialize(body)?),
            MessageKind::StateUpdate => Message::StateUpdate(bincode::deserialize(body)?),
            MessageKind::RestartRequest => Message::RestartRequest,
        };
        Ok(message)
    }
}

impl From<Welcome> for Message {
    fn from(welcome: Welcome) -> Self {
        Message::Welcome(welcome)
    }
}

impl From<Input> for Message {
    fn from(input: Input) -> Self {
        Message::Input(input)
    }
}

impl From<StateUpdate> for Message {
    fn from(update: StateUpdate) -> Self {
        Message::StateUpdate(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_welcome_layout() {
        let bytes = Message::Welcome(Welcome { assigned_id: 3 }).encode().unwrap();
        assert_eq!(bytes, vec![0, 3]);
    }

    #[test]
    fn test_input_layout() {
        let input = Input::new(2, 1.0, -1.0, 0.5, true);
        let bytes = Message::Input(input).encode().unwrap();

        assert_eq!(bytes.len(), INPUT_SIZE);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 2);
        assert_eq!(&bytes[2..6], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[6..10], &(-1.0f32).to_le_bytes());
        assert_eq!(&bytes[10..14], &0.5f32.to_le_bytes());
        assert_eq!(bytes[14], 1);
    }

    #[test]
    fn test_state_update_layout() {
        let mut update = StateUpdate::empty();
        update.players[1] = PlayerState {
            id: 1,
            active: 1,
            x: 120.0,
            y: 340.0,
            rotation: 1.5,
            score: 7,
            is_attacking: 1,
        };

        let bytes = Message::StateUpdate(update).encode().unwrap();
        assert_eq!(bytes.len(), STATE_UPDATE_SIZE);
        assert_eq!(bytes[0], 2);

        let slot = &bytes[1 + PLAYER_STATE_SIZE..1 + 2 * PLAYER_STATE_SIZE];
        assert_eq!(slot[0], 1);
        assert_eq!(slot[1], 1);
        assert_eq!(&slot[2..6], &120.0f32.to_le_bytes());
        assert_eq!(&slot[6..10], &340.0f32.to_le_bytes());
        assert_eq!(&slot[10..14], &1.5f32.to_le_bytes());
        assert_eq!(&slot[14..18], &7u32.to_le_bytes());
        assert_eq!(slot[18], 1);

        // Slot ids are written even for inactive slots.
        assert_eq!(bytes[1 + 3 * PLAYER_STATE_SIZE], 3);
        assert_eq!(bytes[2 + 3 * PLAYER_STATE_SIZE], 0);
    }

    #[test]
    fn test_restart_request_is_single_tag_byte() {
        assert_eq!(Message::RestartRequest.encode().unwrap(), vec![3]);
        assert!(matches!(
            Message::decode(&[3]).unwrap(),
            Message::RestartRequest
        ));
    }

    #[test]
    fn test_decode_input() {
        let mut bytes = vec![1, 0];
        bytes.extend_from_slice(&0.25f32.to_le_bytes());
        bytes.extend_from_slice(&(-0.75f32).to_le_bytes());
        bytes.extend_from_slice(&std::f32::consts::PI.to_le_bytes());
        bytes.push(0);

        match Message::decode(&bytes).unwrap() {
            Message::Input(input) => {
                assert_eq!(input.id, 0);
                assert_approx_eq!(input.dx, 0.25);
                assert_approx_eq!(input.dy, -0.75);
                assert_approx_eq!(input.rotation, std::f32::consts::PI);
                assert!(!input.is_attacking());
            }
            other => panic!("Wrong message after decode: {:?}", other),
        }
    }

    #[test]
    fn test_decode_state_update() {
        let mut update = StateUpdate::empty();
        update.players[0].active = 1;
        update.players[0].score = 42;
        let bytes = Message::StateUpdate(update).encode().unwrap();

        match Message::decode(&bytes).unwrap() {
            Message::StateUpdate(decoded) => {
                assert_eq!(decoded, update);
                assert_eq!(decoded.active_players().count(), 1);
            }
            other => panic!("Wrong message after decode: {:?}", other),
        }
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = Message::Input(Input::default()).encode().unwrap();
        let result = Message::decode(&bytes[..INPUT_SIZE - 1]);

        match result {
            Err(ProtocolError::Truncated {
                kind,
                expected,
                actual,
            }) => {
                assert_eq!(kind, MessageKind::Input);
                assert_eq!(expected, INPUT_SIZE);
                assert_eq!(actual, INPUT_SIZE - 1);
            }
            other => panic!("Expected truncation error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_and_empty() {
        assert!(matches!(
            Message::decode(&[0xFF, 0, 0]),
            Err(ProtocolError::UnknownKind(0xFF))
        ));
        assert!(matches!(Message::decode(&[]), Err(ProtocolError::Empty)));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut bytes = Message::Welcome(Welcome { assigned_id: 1 }).encode().unwrap();
        bytes.extend_from_slice(&[2, 2, 2]);

        assert_eq!(
            Message::decode(&bytes).unwrap(),
            Message::Welcome(Welcome { assigned_id: 1 })
        );
    }

    #[test]
    fn test_wire_sizes_match_kinds() {
        for tag in 0..4u8 {
            let kind = MessageKind::from_tag(tag).unwrap();
            assert_eq!(kind.tag(), tag);
        }
        assert_eq!(STATE_UPDATE_SIZE, 77);
        assert_eq!(MessageKind::StateUpdate.wire_size(), STATE_UPDATE_SIZE);
        assert!(MessageKind::from_tag(4).is_none());
    }
}
