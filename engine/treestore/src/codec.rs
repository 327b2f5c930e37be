//! Base-3 state codec.
//!
//! Board states are strings of up to 64 base-3 digits. For the fixed-width
//! node key the string is left-padded to 64 digits and split into two
//! halves of 32 digits, each decoded into a u64 (32 base-3 digits need 51
//! bits, so both halves always fit).

/// Maximum number of state digits the codec can key.
pub const MAX_STATE_DIGITS: usize = 64;

const HALF_DIGITS: usize = 32;

/// Encode a state string into its two packed halves.
///
/// The caller guarantees the digits are `'0'..='2'` and the length is at
/// most 64; the store only ever sees states produced by a game.
pub fn encode_state(state: &str) -> (u64, u64) {
    let padded = format!("{:0>width$}", state, width = MAX_STATE_DIGITS);
    (
        decode_digits(&padded[..HALF_DIGITS]),
        decode_digits(&padded[HALF_DIGITS..]),
    )
}

/// Decode packed halves back into a state string.
///
/// Leading zeros are stripped; games re-pad to their board size. An empty
/// board therefore decodes to an empty string.
pub fn decode_state(high: u64, low: u64) -> String {
    let mut state = encode_digits(high);
    state.push_str(&format!("{:0>width$}", encode_digits(low), width = HALF_DIGITS));

    state.trim_start_matches('0').to_string()
}

fn decode_digits(digits: &str) -> u64 {
    digits
        .bytes()
        .fold(0u64, |acc, b| acc * 3 + u64::from(b - b'0'))
}

fn encode_digits(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(b'0' + (value % 3) as u8);
        value /= 3;
    }
    digits.reverse();

    String::from_utf8(digits).expect("digits are ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_encodes_to_zero() {
        assert_eq!(encode_state(""), (0, 0));
        assert_eq!(encode_state("000000000"), (0, 0));
        assert_eq!(decode_state(0, 0), "");
    }

    #[test]
    fn short_states_live_in_the_low_half() {
        // "12" = 1*3 + 2 = 5
        assert_eq!(encode_state("12"), (0, 5));
        assert_eq!(decode_state(0, 5), "12");
    }

    #[test]
    fn long_states_split_across_halves() {
        // 40 digits: the first 8 land in the high half after padding
        let state = format!("21{}", "0".repeat(38));
        let (high, low) = encode_state(&state);
        assert_eq!(high, decode_digits("21000000"));
        assert_eq!(low, 0);
        assert_eq!(decode_state(high, low), state);
    }

    #[test]
    fn max_width_state_roundtrips() {
        let state = "12".repeat(32);
        let (high, low) = encode_state(&state);
        assert_eq!(decode_state(high, low), state);
    }

    #[test]
    fn leading_zeros_are_not_preserved() {
        let (high, low) = encode_state("0012");
        assert_eq!(decode_state(high, low), "12");
    }

    #[test]
    fn roundtrip_over_varied_lengths() {
        for len in 1..=MAX_STATE_DIGITS {
            // A repeating non-zero pattern of the requested length
            let state: String = "120211"
                .chars()
                .cycle()
                .take(len)
                .collect::<String>()
                .trim_start_matches('0')
                .to_string();
            let (high, low) = encode_state(&state);
            assert_eq!(decode_state(high, low), state, "length {}", len);
        }
    }
}
