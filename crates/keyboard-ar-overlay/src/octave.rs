use serde::{Deserialize, Serialize};

/// Physical keyboard size the marker strip was printed for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum KeyboardSize {
    #[default]
    Keys49,
    Keys61,
    Keys76,
    Keys88,
    Custom(u32),
}

impl KeyboardSize {
    pub fn key_count(self) -> u32 {
        match self {
            Self::Keys49 => 49,
            Self::Keys61 => 61,
            Self::Keys76 => 76,
            Self::Keys88 => 88,
            Self::Custom(n) => n,
        }
    }

    /// Octave of the segment starting at marker `id`.
    pub fn octave_for_marker(self, id: u32) -> u32 {
        octave_for_marker(id, self.key_count())
    }
}

impl From<u32> for KeyboardSize {
    fn from(keys: u32) -> Self {
        match keys {
            49 => Self::Keys49,
            61 => Self::Keys61,
            76 => Self::Keys76,
            88 => Self::Keys88,
            n => Self::Custom(n),
        }
    }
}

impl From<KeyboardSize> for u32 {
    fn from(size: KeyboardSize) -> Self {
        size.key_count()
    }
}

/// Octave number for the lowest marker id on a `key_count`-key keyboard.
///
/// 88-key keyboards start on A0, so their first full octave is one lower than
/// on the 49/61/76-key layouts. Unknown key counts use the 49-key formula.
pub fn octave_for_marker(id: u32, key_count: u32) -> u32 {
    match key_count {
        88 => (id + 1) / 2,
        _ => (id + 3) / 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_matches_layouts() {
        assert_eq!(octave_for_marker(0, 49), 1);
        assert_eq!(octave_for_marker(1, 49), 2);
        assert_eq!(octave_for_marker(2, 61), 2);
        assert_eq!(octave_for_marker(5, 76), 4);
        assert_eq!(octave_for_marker(0, 88), 0);
        assert_eq!(octave_for_marker(1, 88), 1);
        assert_eq!(octave_for_marker(4, 88), 2);
        assert_eq!(octave_for_marker(0, 37), 1);
    }

    #[test]
    fn keyboard_size_round_trips_key_count() {
        for keys in [49, 61, 76, 88, 25] {
            assert_eq!(u32::from(KeyboardSize::from(keys)), keys);
        }
        assert_eq!(KeyboardSize::Keys88.octave_for_marker(3), 2);
    }

    #[test]
    fn keyboard_size_serializes_as_number() {
        let json = serde_json::to_string(&KeyboardSize::Keys61).expect("serialize");
        assert_eq!(json, "61");
        let back: KeyboardSize = serde_json::from_str("88").expect("deserialize");
        assert_eq!(back, KeyboardSize::Keys88);
    }
}
