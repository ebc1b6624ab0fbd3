// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Room identity derivation.

use sightline_core::types::{ROOM_DELIMITER, ROOM_PREFIX};
use sightline_core::{RoomId, SightlineError, UserId};

/// Derive the canonical room for an unordered pair of participants.
///
/// The result is `call_<min>_<max>`. Ids cannot contain the delimiter, so
/// distinct pairs never produce the same room.
pub fn derive_room_id(a: &UserId, b: &UserId) -> Result<RoomId, SightlineError> {
    if a == b {
        return Err(SightlineError::InvalidArgument(
            "a call needs two distinct participants".to_string(),
        ));
    }
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    Ok(RoomId::from(format!("{ROOM_PREFIX}{low}{ROOM_DELIMITER}{high}")))
}

/// Like [`derive_room_id`], for raw ids that have not been validated yet.
pub fn derive_room_id_str(a: &str, b: &str) -> Result<RoomId, SightlineError> {
    derive_room_id(&UserId::parse(a)?, &UserId::parse(b)?)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::parse(s).unwrap()
    }

    #[test]
    fn orders_ids_lexicographically() {
        let room = derive_room_id(&uid("zed"), &uid("amy")).unwrap();
        assert_eq!(room.as_str(), "call_amy_zed");
    }

    #[test]
    fn matches_object_id_style_ids() {
        let room = derive_room_id(
            &uid("65f1c2aa0000000000000002"),
            &uid("65f1c2aa0000000000000001"),
        )
        .unwrap();
        assert_eq!(
            room.as_str(),
            "call_65f1c2aa0000000000000001_65f1c2aa0000000000000002"
        );
    }

    #[test]
    fn empty_ids_are_invalid() {
        assert!(matches!(
            derive_room_id_str("", "bob"),
            Err(SightlineError::InvalidArgument(_))
        ));
        assert!(matches!(
            derive_room_id_str("alice", ""),
            Err(SightlineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn self_pairing_is_invalid() {
        assert!(matches!(
            derive_room_id(&uid("alice"), &uid("alice")),
            Err(SightlineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn derived_rooms_decode_to_their_participants() {
        let room = derive_room_id(&uid("bob"), &uid("alice")).unwrap();
        assert_eq!(room.participants(), Some((uid("alice"), uid("bob"))));
    }

    proptest! {
        #[test]
        fn derivation_is_commutative(a in "[A-Za-z0-9-]{1,64}", b in "[A-Za-z0-9-]{1,64}") {
            prop_assume!(a != b);
            prop_assert_eq!(
                derive_room_id_str(&a, &b).unwrap(),
                derive_room_id_str(&b, &a).unwrap()
            );
        }

        #[test]
        fn distinct_partners_give_distinct_rooms(
            a in "[A-Za-z0-9-]{1,16}",
            b in "[A-Za-z0-9-]{1,16}",
            c in "[A-Za-z0-9-]{1,16}",
        ) {
            prop_assume!(a != b && a != c && b != c);
            prop_assert_ne!(
                derive_room_id_str(&a, &b).unwrap(),
                derive_room_id_str(&a, &c).unwrap()
            );
        }
    }
}
