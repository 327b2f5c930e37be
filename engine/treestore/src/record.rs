//! On-disk record layouts.
//!
//! Pure byte packing, no I/O. All multi-byte integers are little-endian and
//! every layout is fixed-width:
//!
//! - node key (17 bytes): state high u64, state low u64, player bit
//! - node value (9 bytes): is-end flag, actions address u64
//! - action record (36 bytes): visits u64, points u64, x, y, pass,
//!   child node key (17 bytes)

use crate::codec::{decode_state, encode_state};
use engine_core::Move;

/// Width of a packed node key.
pub const NODE_KEY_LEN: usize = 17;
/// Width of a packed node value.
pub const NODE_VALUE_LEN: usize = 9;
/// Width of a packed action record.
pub const ACTION_LEN: usize = 36;
/// Width of the visits/points prefix rewritten in place by stat updates.
pub const ACTION_STATS_LEN: usize = 16;

/// Sentinel actions address meaning "not yet expanded".
pub const UNASSIGNED: u64 = u64::MAX;

// Node key offsets
const STATE_HIGH_OFFSET: usize = 0;
const STATE_LOW_OFFSET: usize = 8;
const PLAYER_OFFSET: usize = 16;

// Node value offsets
const IS_END_OFFSET: usize = 0;
const ACTIONS_ADDR_OFFSET: usize = 1;

// Action record offsets. Stat updates depend on visits and points being
// first and in that order.
const VISITS_OFFSET: usize = 0;
const POINTS_OFFSET: usize = 8;
const ACTION_X_OFFSET: usize = 16;
const ACTION_Y_OFFSET: usize = 17;
const ACTION_PASS_OFFSET: usize = 18;
const CHILD_KEY_OFFSET: usize = 19;

/// Content address of a node: the packed state plus the to-move bit.
///
/// Two positions reached through different move orders share a key, which
/// is what merges transpositions in the node map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey([u8; NODE_KEY_LEN]);

impl NodeKey {
    /// Build the key for a state with the given player-to-move bit
    /// (`true` = first player).
    pub fn new(state: &str, player_is_a: bool) -> Self {
        let (high, low) = encode_state(state);

        let mut buf = [0u8; NODE_KEY_LEN];
        buf[STATE_HIGH_OFFSET..STATE_HIGH_OFFSET + 8].copy_from_slice(&high.to_le_bytes());
        buf[STATE_LOW_OFFSET..STATE_LOW_OFFSET + 8].copy_from_slice(&low.to_le_bytes());
        buf[PLAYER_OFFSET] = u8::from(player_is_a);

        Self(buf)
    }

    pub fn from_bytes(bytes: [u8; NODE_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NODE_KEY_LEN] {
        &self.0
    }

    /// Decode the state digits, leading zeros stripped.
    pub fn state(&self) -> String {
        let high = u64::from_le_bytes(self.0[STATE_HIGH_OFFSET..STATE_HIGH_OFFSET + 8].try_into().unwrap());
        let low = u64::from_le_bytes(self.0[STATE_LOW_OFFSET..STATE_LOW_OFFSET + 8].try_into().unwrap());
        decode_state(high, low)
    }

    /// Whether the first player is to move in this state.
    pub fn player_is_a(&self) -> bool {
        self.0[PLAYER_OFFSET] == 1
    }
}

/// The stored value of a node: terminal flag and actions-block address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeValue {
    pub is_end: bool,
    pub actions_addr: u64,
}

impl NodeValue {
    /// Value of a freshly created, unexpanded node.
    pub fn unassigned() -> Self {
        Self {
            is_end: false,
            actions_addr: UNASSIGNED,
        }
    }

    pub fn pack(&self) -> [u8; NODE_VALUE_LEN] {
        let mut buf = [0u8; NODE_VALUE_LEN];
        buf[IS_END_OFFSET] = u8::from(self.is_end);
        buf[ACTIONS_ADDR_OFFSET..ACTIONS_ADDR_OFFSET + 8]
            .copy_from_slice(&self.actions_addr.to_le_bytes());
        buf
    }

    pub fn unpack(buf: &[u8; NODE_VALUE_LEN]) -> Self {
        Self {
            is_end: buf[IS_END_OFFSET] == 1,
            actions_addr: u64::from_le_bytes(
                buf[ACTIONS_ADDR_OFFSET..ACTIONS_ADDR_OFFSET + 8]
                    .try_into()
                    .unwrap(),
            ),
        }
    }
}

/// One 36-byte action record as stored inside an actions block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRecord {
    pub visits: u64,
    /// Doubled points, so a draw (one half point) stays integral.
    pub points: u64,
    pub x: u8,
    pub y: u8,
    pub pass: bool,
    pub child_key: NodeKey,
}

impl ActionRecord {
    /// A fresh record for a move leading to `child_key`.
    pub fn new(mv: Move, child_key: NodeKey) -> Self {
        Self {
            visits: 0,
            points: 0,
            x: mv.x,
            y: mv.y,
            pass: mv.pass,
            child_key,
        }
    }

    /// The move this record represents.
    pub fn game_move(&self) -> Move {
        Move {
            x: self.x,
            y: self.y,
            pass: self.pass,
        }
    }

    /// Pack into `buf`, which must hold at least [`ACTION_LEN`] bytes.
    pub fn pack(&self, buf: &mut [u8]) {
        buf[VISITS_OFFSET..VISITS_OFFSET + 8].copy_from_slice(&self.visits.to_le_bytes());
        buf[POINTS_OFFSET..POINTS_OFFSET + 8].copy_from_slice(&self.points.to_le_bytes());
        buf[ACTION_X_OFFSET] = self.x;
        buf[ACTION_Y_OFFSET] = self.y;
        buf[ACTION_PASS_OFFSET] = u8::from(self.pass);
        buf[CHILD_KEY_OFFSET..CHILD_KEY_OFFSET + NODE_KEY_LEN]
            .copy_from_slice(self.child_key.as_bytes());
    }

    /// Unpack from `buf`, which must hold at least [`ACTION_LEN`] bytes.
    pub fn unpack(buf: &[u8]) -> Self {
        let mut key = [0u8; NODE_KEY_LEN];
        key.copy_from_slice(&buf[CHILD_KEY_OFFSET..CHILD_KEY_OFFSET + NODE_KEY_LEN]);

        Self {
            visits: u64::from_le_bytes(buf[VISITS_OFFSET..VISITS_OFFSET + 8].try_into().unwrap()),
            points: u64::from_le_bytes(buf[POINTS_OFFSET..POINTS_OFFSET + 8].try_into().unwrap()),
            x: buf[ACTION_X_OFFSET],
            y: buf[ACTION_Y_OFFSET],
            pass: buf[ACTION_PASS_OFFSET] == 1,
            child_key: NodeKey::from_bytes(key),
        }
    }
}

/// Pack a stats update: the 16-byte visits/points prefix of a record.
pub fn pack_stats(visits: u64, points: u64) -> [u8; ACTION_STATS_LEN] {
    let mut buf = [0u8; ACTION_STATS_LEN];
    buf[VISITS_OFFSET..VISITS_OFFSET + 8].copy_from_slice(&visits.to_le_bytes());
    buf[POINTS_OFFSET..POINTS_OFFSET + 8].copy_from_slice(&points.to_le_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_key_layout_is_byte_exact() {
        // "12" decodes to 5 in the low half; player A to move
        let key = NodeKey::new("12", true);
        let bytes = key.as_bytes();

        assert_eq!(&bytes[0..8], &[0u8; 8]); // high half empty
        assert_eq!(&bytes[8..16], &5u64.to_le_bytes());
        assert_eq!(bytes[16], 1);

        assert_eq!(key.state(), "12");
        assert!(key.player_is_a());
    }

    #[test]
    fn keys_differ_by_player_bit() {
        let a = NodeKey::new("12", true);
        let b = NodeKey::new("12", false);
        assert_ne!(a, b);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn node_value_roundtrip() {
        let value = NodeValue {
            is_end: true,
            actions_addr: 37,
        };
        assert_eq!(NodeValue::unpack(&value.pack()), value);

        let fresh = NodeValue::unassigned();
        assert!(!fresh.is_end);
        assert_eq!(fresh.actions_addr, UNASSIGNED);
        assert_eq!(NodeValue::unpack(&fresh.pack()), fresh);
    }

    #[test]
    fn node_value_layout_is_byte_exact() {
        let value = NodeValue {
            is_end: false,
            actions_addr: 0x0102030405060708,
        };
        let buf = value.pack();
        assert_eq!(buf[0], 0);
        assert_eq!(&buf[1..9], &[8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn action_record_roundtrip() {
        let record = ActionRecord {
            visits: 12,
            points: 7,
            x: 2,
            y: 1,
            pass: false,
            child_key: NodeKey::new("2101", false),
        };

        let mut buf = [0u8; ACTION_LEN];
        record.pack(&mut buf);
        assert_eq!(ActionRecord::unpack(&buf), record);
    }

    #[test]
    fn action_record_layout_is_byte_exact() {
        let record = ActionRecord {
            visits: 1,
            points: 2,
            x: 3,
            y: 4,
            pass: true,
            child_key: NodeKey::new("1", true),
        };

        let mut buf = [0u8; ACTION_LEN];
        record.pack(&mut buf);

        assert_eq!(&buf[0..8], &1u64.to_le_bytes());
        assert_eq!(&buf[8..16], &2u64.to_le_bytes());
        assert_eq!(buf[16], 3);
        assert_eq!(buf[17], 4);
        assert_eq!(buf[18], 1);
        assert_eq!(&buf[19..36], record.child_key.as_bytes());
    }

    #[test]
    fn stats_prefix_matches_record_layout() {
        let record = ActionRecord {
            visits: 9,
            points: 5,
            x: 0,
            y: 0,
            pass: false,
            child_key: NodeKey::new("", true),
        };

        let mut buf = [0u8; ACTION_LEN];
        record.pack(&mut buf);
        assert_eq!(&buf[..ACTION_STATS_LEN], &pack_stats(9, 5));
    }

    #[test]
    fn key_is_copied_by_value_into_the_record() {
        let key = NodeKey::new("21", true);
        let record = ActionRecord::new(Move::place(1, 1), key);

        let mut buf = [0u8; ACTION_LEN];
        record.pack(&mut buf);
        let decoded = ActionRecord::unpack(&buf);

        assert_eq!(decoded.child_key, key);
        assert_eq!(decoded.visits, 0);
        assert_eq!(decoded.game_move(), Move::place(1, 1));
    }
}
