//! The learning-info capability
//!
//! A single zero-argument tool that tells the caller what they are learning.

/// Name under which the capability is registered
pub const TOOL_NAME: &str = "what_am_i_learning";

/// Description published in `tools/list`
pub const TOOL_DESCRIPTION: &str = "Responds with what the user is learning.";

/// The fixed answer
pub const LEARNING_MESSAGE: &str = "You are learning about MCP (Multi-Channel Processing)!";

/// Responds with what the user is learning.
pub fn what_am_i_learning() -> String {
    LEARNING_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_fixed_message() {
        assert_eq!(
            what_am_i_learning(),
            "You are learning about MCP (Multi-Channel Processing)!"
        );
    }

    #[test]
    fn test_repeated_calls_identical() {
        let first = what_am_i_learning();
        for _ in 0..10 {
            assert_eq!(what_am_i_learning(), first);
        }
    }
}
