/// ID types for Chorus entities
///
/// The chat platform hands out 64-bit snowflakes for guilds, members and
/// channels; each gets its own newtype so they can't be mixed up.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw platform id
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw platform id
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

snowflake_id!(
    /// Voice session identifier (one per guild / group)
    SessionId
);

snowflake_id!(
    /// Member who invoked a command
    ParticipantId
);

snowflake_id!(
    /// Voice channel a player or participant sits in
    VoiceChannelId
);
