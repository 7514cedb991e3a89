//! Console input parsing
//!
//! Maps one line of user input to a session intent:
//! - `/join <name>`
//! - `/pm <connection-id> <text>`
//! - `/users`
//! - `/quit`
//! - anything else is a chat message

use crate::session::Intent;
use crate::types::ConnectionId;

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Forward to the session
    Intent(Intent),
    /// Print the online users
    ListUsers,
    /// Print usage
    Help(&'static str),
}

pub const USAGE: &str = "commands: /join <name>, /pm <id> <text>, /users, /quit";

/// Parse one input line
///
/// Returns None for blank lines.
pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Intent(Intent::SendMessage {
            text: line.to_string(),
        }));
    };

    let (name, args) = split_word(rest);
    let command = match name {
        "join" => Command::Intent(Intent::Join {
            username: args.to_string(),
        }),
        "pm" | "msg" => {
            let (to, text) = split_word(args);
            if to.is_empty() {
                Command::Help(USAGE)
            } else {
                Command::Intent(Intent::SendPrivateMessage {
                    to: ConnectionId::new(to),
                    text: text.to_string(),
                })
            }
        }
        "users" => Command::ListUsers,
        "quit" | "leave" => Command::Intent(Intent::Leave),
        _ => Command::Help(USAGE),
    };
    Some(command)
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_message() {
        assert_eq!(
            parse_line("  hello there "),
            Some(Command::Intent(Intent::SendMessage {
                text: "hello there".to_string()
            }))
        );
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn test_join() {
        assert_eq!(
            parse_line("/join Alice"),
            Some(Command::Intent(Intent::Join {
                username: "Alice".to_string()
            }))
        );
    }

    #[test]
    fn test_private_message() {
        assert_eq!(
            parse_line("/pm sock-2  see you at noon"),
            Some(Command::Intent(Intent::SendPrivateMessage {
                to: ConnectionId::new("sock-2"),
                text: "see you at noon".to_string(),
            }))
        );
        assert_eq!(parse_line("/pm"), Some(Command::Help(USAGE)));
    }

    #[test]
    fn test_other_commands() {
        assert_eq!(parse_line("/users"), Some(Command::ListUsers));
        assert_eq!(parse_line("/quit"), Some(Command::Intent(Intent::Leave)));
        assert_eq!(parse_line("/dance"), Some(Command::Help(USAGE)));
    }
}
