//! # Token Module
//!
//! Genera l'identificatore opaco usato come nome file degli asset esportati.
//! Il nome originale e l'ordine di ingestione non sono ricostruibili dal token.

use std::fmt;
use uuid::Uuid;

/// Number of hex characters kept from the random identifier
pub const TOKEN_LEN: usize = 12;

/// Opaque, uppercase hexadecimal filename stem for an exported asset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Generate a fresh token from a random 128-bit identifier
    pub fn generate() -> Self {
        let mut buf = Uuid::encode_buffer();
        let hex = Uuid::new_v4().simple().encode_upper(&mut buf);
        Self(hex[..TOKEN_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_shape() {
        let token = Token::generate();
        assert_eq!(token.as_str().len(), TOKEN_LEN);
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_tokens_do_not_collide() {
        let tokens: HashSet<Token> = (0..10_000).map(|_| Token::generate()).collect();
        assert_eq!(tokens.len(), 10_000);
    }
}
