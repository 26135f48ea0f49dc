//! Player command parsing.
//!
//! Input is one line of text. The first token picks the verb; whatever follows
//! is joined back with single spaces and used as the target name.

use crate::game::errors::GameError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    Explore,                // explore - list items in this room
    Examine(String),        // examine <item>
    Push(String),           // push <item>
    Use(String),            // use <item> (also: inventory use <item>)
    Inventory,              // inventory
    Map,                    // map
    Status,                 // status
    Hint,                   // hint
    Achievements,           // achievements
    Save,                   // save
    Load,                   // load
    Help,                   // help
    Quit,                   // quit (asks for confirmation)
}

impl GameCommand {
    /// Commands that can change game progress.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            GameCommand::Examine(_) | GameCommand::Push(_) | GameCommand::Hint | GameCommand::Load
        )
    }

    pub fn verb(&self) -> &'static str {
        match self {
            GameCommand::Explore => "explore",
            GameCommand::Examine(_) => "examine",
            GameCommand::Push(_) => "push",
            GameCommand::Use(_) => "use",
            GameCommand::Inventory => "inventory",
            GameCommand::Map => "map",
            GameCommand::Status => "status",
            GameCommand::Hint => "hint",
            GameCommand::Achievements => "achievements",
            GameCommand::Save => "save",
            GameCommand::Load => "load",
            GameCommand::Help => "help",
            GameCommand::Quit => "quit",
        }
    }
}

/// Every verb, in help order.
pub const VERBS: &[&str] = &[
    "explore",
    "examine",
    "push",
    "use",
    "inventory",
    "map",
    "status",
    "hint",
    "achievements",
    "save",
    "load",
    "help",
    "quit",
];

fn target(verb: &str, rest: &[&str]) -> Result<String, GameError> {
    if rest.is_empty() {
        Err(GameError::InvalidCommand(format!("Usage: {} <item>", verb)))
    } else {
        Ok(rest.join(" "))
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(input: &str) -> Result<Option<GameCommand>, GameError> {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some((&verb, rest)) = parts.split_first() else {
        return Ok(None);
    };

    let command = match verb {
        "explore" => GameCommand::Explore,
        "examine" => GameCommand::Examine(target(verb, rest)?),
        "push" => GameCommand::Push(target(verb, rest)?),
        "use" => GameCommand::Use(target(verb, rest)?),
        "inventory" => match rest {
            [] => GameCommand::Inventory,
            ["use", item @ ..] => GameCommand::Use(target("inventory use", item)?),
            _ => {
                return Err(GameError::InvalidCommand(
                    "Usage: inventory [use <item>]".to_string(),
                ))
            }
        },
        "map" => GameCommand::Map,
        "status" => GameCommand::Status,
        "hint" => GameCommand::Hint,
        "achievements" => GameCommand::Achievements,
        "save" => GameCommand::Save,
        "load" => GameCommand::Load,
        "help" => GameCommand::Help,
        "quit" => GameCommand::Quit,
        other => {
            return Err(GameError::InvalidCommand(format!(
                "'{}' is not a command. Type 'help' for the list.",
                other
            )))
        }
    };
    Ok(Some(command))
}

/// Answers to yes/no prompts. Anything else counts as no.
pub fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "yes" | "y" | "si")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_multi_word_targets() {
        assert_eq!(
            parse("examine   Dining   TABLE ").unwrap(),
            Some(GameCommand::Examine("dining table".into()))
        );
        assert_eq!(
            parse("push dining table").unwrap(),
            Some(GameCommand::Push("dining table".into()))
        );
    }

    #[test]
    fn inventory_use_alias() {
        assert_eq!(
            parse("inventory use golden compass").unwrap(),
            Some(GameCommand::Use("golden compass".into()))
        );
        assert_eq!(parse("inventory").unwrap(), Some(GameCommand::Inventory));
        assert!(parse("inventory drop x").is_err());
        assert!(parse("inventory use").is_err());
    }

    #[test]
    fn missing_target_is_invalid() {
        for verb in ["examine", "push", "use"] {
            match parse(verb) {
                Err(GameError::InvalidCommand(msg)) => assert!(msg.contains(verb)),
                other => panic!("{} -> {:?}", verb, other),
            }
        }
    }

    #[test]
    fn unknown_verb_is_invalid() {
        assert!(matches!(parse("dance"), Err(GameError::InvalidCommand(_))));
    }

    #[test]
    fn blank_is_ignored() {
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn every_verb_parses() {
        for verb in VERBS {
            let line = if matches!(*verb, "examine" | "push" | "use") {
                format!("{} thing", verb)
            } else {
                verb.to_string()
            };
            let cmd = parse(&line).unwrap().unwrap();
            assert_eq!(cmd.verb(), *verb);
        }
    }

    #[test]
    fn yes_answers() {
        assert!(is_affirmative(" YES "));
        assert!(is_affirmative("y"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("sure"));
    }
}
