use thiserror::Error;

/// Outcomes the command loop reports back to the player. None of them end a session.
#[derive(Debug, Error)]
pub enum GameError {
    /// Unrecognized verb or a verb missing its target.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Target name not present in the current scope (room or inventory).
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Door examined without its key.
    #[error("{door} is locked. {mechanism}")]
    LockedDoor { door: String, mechanism: String },

    /// Treasure or key source already awarded.
    #[error("already collected: {0}")]
    AlreadyCollected(String),

    /// `load` with nothing saved under the slot.
    #[error("no saved session: {0}")]
    NoSavedSession(String),

    #[error("no hints remaining")]
    NoHintsLeft,

    /// A snapshot that does not fit the world it is restored against.
    #[error("corrupt save: {0}")]
    CorruptSave(String),

    #[error("invalid world: {0}")]
    InvalidWorld(#[from] WorldError),

    /// Input after the session ended.
    #[error("the session is over")]
    SessionOver,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GameError {
    /// True for player-facing mistakes; false for storage or authoring faults.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            GameError::Io(_) | GameError::Json(_) | GameError::InvalidWorld(_)
        )
    }
}

/// Authoring faults found while building or validating a world.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("duplicate room '{0}'")]
    DuplicateRoom(String),

    #[error("duplicate item '{0}'")]
    DuplicateItem(String),

    #[error("unknown room '{0}'")]
    UnknownRoom(String),

    #[error("room '{room}' lists unknown item '{item}'")]
    UnknownItem { room: String, item: String },

    #[error("door '{0}' must connect two distinct rooms")]
    DoorLoop(String),

    #[error("door '{door}' is not listed in room '{room}'")]
    DoorNotListed { door: String, room: String },

    #[error("'{holder}' hides '{item}', which is not a key or treasure")]
    BadContents { holder: String, item: String },

    #[error("'{0}' is hidden in more than one place")]
    HiddenTwice(String),

    #[error("key '{key}' targets '{target}', which is not a door")]
    BadKeyTarget { key: String, target: String },

    #[error("start and target room are both '{0}'")]
    StartIsTarget(String),

    #[error("target room '{target}' cannot be reached from '{start}'")]
    Unreachable { start: String, target: String },
}
