use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum Hand {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum Finger {
    LeftPinky,
    LeftRing,
    LeftMiddle,
    LeftIndex,
    LeftThumb,
    RightPinky,
    RightRing,
    RightMiddle,
    RightIndex,
    RightThumb,
}

impl Finger {
    /// Every finger, left hand first, pinky to thumb
    pub const ALL: [Finger; 10] = [
        Finger::LeftPinky,
        Finger::LeftRing,
        Finger::LeftMiddle,
        Finger::LeftIndex,
        Finger::LeftThumb,
        Finger::RightPinky,
        Finger::RightRing,
        Finger::RightMiddle,
        Finger::RightIndex,
        Finger::RightThumb,
    ];

    pub fn hand(self) -> Hand {
        match self {
            Finger::LeftPinky
            | Finger::LeftRing
            | Finger::LeftMiddle
            | Finger::LeftIndex
            | Finger::LeftThumb => Hand::Left,
            Finger::RightPinky
            | Finger::RightRing
            | Finger::RightMiddle
            | Finger::RightIndex
            | Finger::RightThumb => Hand::Right,
        }
    }

    /// Compact label used in the stats table
    pub fn short_name(self) -> &'static str {
        match self {
            Finger::LeftPinky => "Lpinky",
            Finger::LeftRing => "Lring",
            Finger::LeftMiddle => "Lmiddl",
            Finger::LeftIndex => "Lindex",
            Finger::LeftThumb => "Lthumb",
            Finger::RightPinky => "Rpinky",
            Finger::RightRing => "Rring",
            Finger::RightMiddle => "Rmiddl",
            Finger::RightIndex => "Rindex",
            Finger::RightThumb => "Rthumb",
        }
    }
}

/// Standard touch-typing assignment. The left thumb owns nothing and the
/// right thumb owns the space bar.
pub const QWERTY_LAYOUT: [(Finger, &str); 10] = [
    (Finger::LeftPinky, "qazQAZ"),
    (Finger::LeftRing, "wsxWSX"),
    (Finger::LeftMiddle, "edcEDC"),
    (Finger::LeftIndex, "rfvtgbRFVTGB"),
    (Finger::LeftThumb, ""),
    (Finger::RightPinky, "pP"),
    (Finger::RightRing, "olOL"),
    (Finger::RightMiddle, "ikIK"),
    (Finger::RightIndex, "ujmyhnUJMYHN"),
    (Finger::RightThumb, " "),
];

pub const QWERTY_CHARACTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A supported character has no finger
    Unassigned(char),
    /// A character was given to two fingers
    Duplicate {
        character: char,
        first: Finger,
        second: Finger,
    },
    /// A finger owns a character outside the supported set
    Unsupported { character: char, finger: Finger },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Unassigned(c) => write!(f, "{c:?} is not assigned to a finger"),
            LayoutError::Duplicate {
                character,
                first,
                second,
            } => write!(
                f,
                "{character:?} is assigned to both {first} and {second}"
            ),
            LayoutError::Unsupported { character, finger } => write!(
                f,
                "{finger} owns {character:?}, which is not in the supported character set"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Immutable character -> finger partition with O(1) lookup
#[derive(Debug, Clone)]
pub struct FingerMap {
    table: HashMap<char, Finger>,
}

impl FingerMap {
    /// Build a map from per-finger assignments. Every character of
    /// `supported` must belong to exactly one finger, and fingers may only
    /// own supported characters.
    pub fn new(assignments: &[(Finger, &str)], supported: &str) -> Result<Self, LayoutError> {
        let supported: HashSet<char> = supported.chars().collect();
        let mut table = HashMap::with_capacity(supported.len());

        for &(finger, chars) in assignments {
            for character in chars.chars() {
                if !supported.contains(&character) {
                    return Err(LayoutError::Unsupported { character, finger });
                }
                if let Some(first) = table.insert(character, finger) {
                    return Err(LayoutError::Duplicate {
                        character,
                        first,
                        second: finger,
                    });
                }
            }
        }

        // sorted so the reported character is deterministic
        let mut missing: Vec<char> = supported
            .iter()
            .copied()
            .filter(|c| !table.contains_key(c))
            .collect();
        missing.sort_unstable();
        if let Some(&c) = missing.first() {
            return Err(LayoutError::Unassigned(c));
        }

        tracing::debug!(characters = table.len(), "finger map built");
        Ok(Self { table })
    }

    pub fn qwerty() -> Self {
        match Self::new(&QWERTY_LAYOUT, QWERTY_CHARACTERS) {
            Ok(map) => map,
            Err(e) => panic!("built-in qwerty layout is inconsistent: {e}"),
        }
    }

    pub fn is_valid(&self, c: char) -> bool {
        self.table.contains_key(&c)
    }

    /// Finger owning `c`.
    ///
    /// # Panics
    /// If `c` is not in the supported set. Callers filter with
    /// [`FingerMap::is_valid`] first, so reaching the panic means the
    /// valid-character filter and the map disagree.
    pub fn lookup(&self, c: char) -> Finger {
        match self.table.get(&c) {
            Some(finger) => *finger,
            None => panic!("{c:?} ({}) is not assigned to a finger", c as u32),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for FingerMap {
    fn default() -> Self {
        Self::qwerty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qwerty_covers_letters_and_space() {
        let map = FingerMap::qwerty();
        assert_eq!(map.len(), 53);
        for c in QWERTY_CHARACTERS.chars() {
            assert!(map.is_valid(c), "{c:?} should be valid");
        }
        assert!(!map.is_valid('1'));
        assert!(!map.is_valid('\n'));
    }

    #[test]
    fn qwerty_lookup() {
        let map = FingerMap::qwerty();
        assert_eq!(map.lookup('a'), Finger::LeftPinky);
        assert_eq!(map.lookup('T'), Finger::LeftIndex);
        assert_eq!(map.lookup('h'), Finger::RightIndex);
        assert_eq!(map.lookup('i'), Finger::RightMiddle);
        assert_eq!(map.lookup('P'), Finger::RightPinky);
        assert_eq!(map.lookup(' '), Finger::RightThumb);
    }

    #[test]
    fn left_thumb_owns_nothing_in_qwerty() {
        let map = FingerMap::qwerty();
        assert!(QWERTY_CHARACTERS
            .chars()
            .all(|c| map.lookup(c) != Finger::LeftThumb));
    }

    #[test]
    fn finger_hands() {
        assert_eq!(Finger::LeftThumb.hand(), Hand::Left);
        assert_eq!(Finger::RightThumb.hand(), Hand::Right);
        let left = Finger::ALL.iter().filter(|f| f.hand() == Hand::Left).count();
        assert_eq!(left, 5);
    }

    #[test]
    fn rejects_duplicate_assignment() {
        let err = FingerMap::new(
            &[(Finger::LeftIndex, "ab"), (Finger::RightIndex, "b")],
            "ab",
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::Duplicate {
                character: 'b',
                first: Finger::LeftIndex,
                second: Finger::RightIndex
            }
        );
    }

    #[test]
    fn rejects_unassigned_character() {
        let err = FingerMap::new(&[(Finger::LeftIndex, "a")], "abc").unwrap_err();
        assert_eq!(err, LayoutError::Unassigned('b'));
        assert_eq!(err.to_string(), "'b' is not assigned to a finger");
    }

    #[test]
    fn rejects_unsupported_character() {
        let err = FingerMap::new(&[(Finger::LeftIndex, "a1")], "a").unwrap_err();
        assert_eq!(
            err,
            LayoutError::Unsupported {
                character: '1',
                finger: Finger::LeftIndex
            }
        );
    }

    #[test]
    fn alternate_layout_can_use_left_thumb() {
        let map = FingerMap::new(
            &[(Finger::LeftThumb, " "), (Finger::RightIndex, "xy")],
            "xy ",
        )
        .unwrap();
        assert_eq!(map.lookup(' '), Finger::LeftThumb);
    }

    #[test]
    #[should_panic(expected = "is not assigned to a finger")]
    fn lookup_outside_supported_set_is_fatal() {
        FingerMap::qwerty().lookup('7');
    }
}
