use std::fmt;

/// The peer that receives (and handles) a packet.
///
/// A packet bound to [`Side::Server`] is sent by clients; one bound to
/// [`Side::Client`] is sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    Client,
    Server,
}

impl Side {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Client => Self::Server,
            Self::Server => Self::Client,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => f.write_str("client"),
            Self::Server => f.write_str("server"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_flips() {
        assert_eq!(Side::Client.opposite(), Side::Server);
        assert_eq!(Side::Server.opposite().opposite(), Side::Server);
        assert_eq!(Side::Client.to_string(), "client");
    }
}
