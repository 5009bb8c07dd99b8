use std::fmt;

use serde::Serialize;

/// Stage of a save lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    Idle,
    Exporting,
    Encoding,
    Addressing,
    Committing,
    Writing,
    Committed,
    Cancelled,
    Failed,
}

impl SaveState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Cancelled | Self::Failed)
    }

    /// Whether `next` may follow `self`.
    ///
    /// Stages run strictly in order. Any working stage may fail; only the
    /// write can be cancelled; every terminal state returns to idle.
    pub fn can_advance_to(self, next: SaveState) -> bool {
        use SaveState::*;
        match (self, next) {
            (Idle, Exporting)
            | (Exporting, Encoding)
            | (Encoding, Addressing)
            | (Addressing, Committing)
            | (Committing, Writing)
            | (Writing, Committed)
            | (Writing, Cancelled) => true,
            (Exporting | Encoding | Addressing | Committing | Writing, Failed) => true,
            (Committed | Cancelled | Failed, Idle) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Exporting => "exporting",
            Self::Encoding => "encoding",
            Self::Addressing => "addressing",
            Self::Committing => "committing",
            Self::Writing => "writing",
            Self::Committed => "committed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SaveState::*;

    #[test]
    fn happy_path_is_valid() {
        let path = [Idle, Exporting, Encoding, Addressing, Committing, Writing, Committed, Idle];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn stages_cannot_be_skipped() {
        assert!(!Idle.can_advance_to(Writing));
        assert!(!Exporting.can_advance_to(Committing));
        assert!(!Committed.can_advance_to(Exporting));
    }

    #[test]
    fn only_writing_can_cancel() {
        assert!(Writing.can_advance_to(Cancelled));
        assert!(!Committing.can_advance_to(Cancelled));
        assert!(!Idle.can_advance_to(Failed));
    }

    #[test]
    fn terminal_states() {
        assert!(Committed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Writing.is_terminal());
    }
}
