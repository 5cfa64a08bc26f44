//! Terminal command parsing

use shared::ContentId;

/// A command typed by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Join a room, optionally avoiding one video
    Join { ignore: Option<ContentId> },
    /// Join a new room, avoiding the video currently assigned
    Next,
    Leave,
    Quit,
    Help,
}

pub const HELP: &str = "Commands: join [video], next, leave, quit, help";

/// Parses one input line. Returns None for unrecognized input.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match words.next()?.to_ascii_lowercase().as_str() {
        "join" | "j" => {
            let ignore = match words.next() {
                Some(word) => Some(word.parse().ok()?),
                None => None,
            };
            Command::Join { ignore }
        }
        "next" | "n" => Command::Next,
        "leave" | "l" => Command::Leave,
        "quit" | "q" | "exit" => Command::Quit,
        "help" | "h" | "?" => Command::Help,
        _ => return None,
    };

    if words.next().is_some() {
        return None;
    }
    Some(command)
}
