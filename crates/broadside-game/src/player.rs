//! Player identity.

use std::net::SocketAddr;

use crate::GameError;

/// A participant: declared name plus optional endpoint metadata.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    endpoint: Option<SocketAddr>,
}

impl Player {
    /// A player with the given display name.
    ///
    /// The name travels in the HELLO argument, so it must be non-empty
    /// and free of line terminators.
    pub fn new(name: impl Into<String>) -> Result<Self, GameError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.contains(['\r', '\n']) {
            return Err(GameError::InvalidName(name));
        }
        Ok(Self {
            name: trimmed.to_string(),
            endpoint: None,
        })
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The remote endpoint, once known.
    pub fn endpoint(&self) -> Option<SocketAddr> {
        self.endpoint
    }

    /// Records the endpoint this player is reachable at.
    pub fn set_endpoint(&mut self, endpoint: SocketAddr) {
        self.endpoint = Some(endpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        let player = Player::new("  Alice  ").unwrap();
        assert_eq!(player.name(), "Alice");
    }

    #[test]
    fn test_empty_and_multiline_names_rejected() {
        assert!(Player::new("").is_err());
        assert!(Player::new("   ").is_err());
        assert!(Player::new("Al\nice").is_err());
    }

    #[test]
    fn test_endpoint_metadata() {
        let mut player = Player::new("Alice").unwrap();
        assert!(player.endpoint().is_none());

        let addr = "127.0.0.1:7870".parse().unwrap();
        player.set_endpoint(addr);
        assert_eq!(player.endpoint(), Some(addr));
    }
}
