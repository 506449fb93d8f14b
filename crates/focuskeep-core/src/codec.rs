//! Snapshot codec.
//!
//! Serializes the set of live timer states to a JSON byte blob and back.
//! Decoding is total-safe: malformed input yields a [`CodecError`], never a
//! partial state list and never a panic. Record order carries no meaning;
//! duplicate entity ids resolve last-wins.

use std::collections::HashMap;

use crate::error::CodecError;
use crate::timer::{EntityId, TimerState};

pub fn encode(states: &[TimerState]) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(states).map_err(|e| CodecError::Encode(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<Vec<TimerState>, CodecError> {
    let raw: Vec<TimerState> = serde_json::from_slice(bytes)?;

    let mut ordered: Vec<TimerState> = Vec::with_capacity(raw.len());
    let mut index: HashMap<EntityId, usize> = HashMap::new();
    for mut state in raw {
        // The stored flag is redundant with the pause anchor; the anchor
        // wins when a half-written record disagrees.
        state.is_paused = state.paused_at.is_some();
        match index.get(&state.entity_id) {
            Some(&i) => ordered[i] = state,
            None => {
                index.insert(state.entity_id, ordered.len());
                ordered.push(state);
            }
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::CategorySnapshot;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn state_for(id: u128, total_secs: u64) -> TimerState {
        TimerState {
            entity_id: EntityId::from(Uuid::from_u128(id)),
            entity_label: "Avery".into(),
            category: CategorySnapshot {
                id: Uuid::from_u128(id.wrapping_add(1)),
                label: "Reading".into(),
                icon: "book.fill".into(),
                color: "#FF6B6B".into(),
            },
            started_at: base(),
            total_secs,
            paused_secs: 0,
            paused_at: None,
            is_paused: false,
        }
    }

    #[test]
    fn round_trip_preserves_fields() {
        let states = vec![state_for(1, 1500), state_for(2, 600)];
        let decoded = decode(&encode(&states).unwrap()).unwrap();
        assert_eq!(decoded, states);
    }

    #[test]
    fn empty_set_round_trips() {
        let decoded = decode(&encode(&[]).unwrap()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(decode(b"").is_err());
        assert!(decode(b"not json at all").is_err());
        assert!(decode(b"{\"unexpected\": \"shape\"}").is_err());

        // Truncated mid-record.
        let bytes = encode(&[state_for(1, 1500)]).unwrap();
        assert!(decode(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn duplicate_ids_resolve_last_wins() {
        let mut first = state_for(7, 600);
        let second = state_for(7, 1800);
        first.entity_label = "Old".into();

        let decoded = decode(&encode(&[first, second.clone()]).unwrap()).unwrap();
        assert_eq!(decoded, vec![second]);
    }

    #[test]
    fn pause_flag_is_repaired_from_anchor() {
        let mut state = state_for(3, 900);
        state.is_paused = true; // anchor says running

        let decoded = decode(&encode(&[state]).unwrap()).unwrap();
        assert!(!decoded[0].is_paused);

        let mut state = state_for(4, 900);
        state.paused_at = Some(base() + Duration::seconds(30));
        state.is_paused = false; // anchor says paused

        let decoded = decode(&encode(&[state]).unwrap()).unwrap();
        assert!(decoded[0].is_paused);
    }

    fn arb_state() -> impl Strategy<Value = TimerState> {
        (
            "[a-z]{1,12}",
            1u64..=86_400,
            0u64..=3_600,
            proptest::option::of(0i64..=7_200),
            0i64..=100_000,
        )
            .prop_map(|(label, total_secs, paused_secs, pause_offset, start_offset)| {
                let started_at = base() + Duration::seconds(start_offset);
                let paused_at = pause_offset.map(|o| started_at + Duration::seconds(o));
                TimerState {
                    entity_id: EntityId::new(),
                    entity_label: label.clone(),
                    category: CategorySnapshot {
                        id: Uuid::new_v4(),
                        label,
                        icon: "star".into(),
                        color: "#4ECDC4".into(),
                    },
                    started_at,
                    total_secs,
                    paused_secs,
                    is_paused: paused_at.is_some(),
                    paused_at,
                }
            })
    }

    proptest! {
        #[test]
        fn round_trip_is_identity(states in proptest::collection::vec(arb_state(), 0..8)) {
            let decoded = decode(&encode(&states).unwrap()).unwrap();
            prop_assert_eq!(decoded, states);
        }
    }
}
