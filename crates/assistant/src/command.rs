//! Parsing of REPL command lines.

use serde_json::Value;
use smithers_core::{EntryRange, EntryUpdate, Error, Result, Role, Selector};
use smithers_visualizer::OutputFormat;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Command list shown by `help` and the REPL banner.
pub const HELP: &str = "\
Commands:
  chat <message>                                 Chat with Smithers
  create <role> <content>                        Add a context entry
  read [index|start:end|role]                    Read context
  update <index> <role|content|metadata> <value> Update an entry (metadata is a JSON object)
  delete <index|start:end|role>                  Delete entries
  search <query>                                 Search context
  compact [start:end]                            Summarize a range into one entry
  stats                                          Show context statistics
  clear                                          Clear all context
  save <path>                                    Save context to a JSON file
  load <path>                                    Load context from a JSON file
  rag <query>                                    Chat grounded in matching context
  visualize [output] [start:end]                 Draw the conversation graph (alias: viz)
  help                                           Show this list
  exit | quit | q                                Leave Smithers";

/// One parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Chat(String),
    Create { role: Role, content: String },
    Read(Selector),
    Update { index: usize, update: EntryUpdate },
    Delete(Selector),
    Search(String),
    Compact(EntryRange),
    Stats,
    Clear,
    Save(PathBuf),
    Load(PathBuf),
    Rag(String),
    Visualize {
        output: Option<PathBuf>,
        range: EntryRange,
    },
    Help,
    Exit,
    /// Blank line
    Empty,
}

impl Command {
    /// Parse a line. The command word is case-insensitive; arguments are
    /// kept as typed.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Empty);
        }

        let (word, args) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "chat" => required(args, "chat").map(Command::Chat),
            "create" => parse_create(args),
            "read" => {
                if args.is_empty() {
                    Ok(Command::Read(Selector::all()))
                } else {
                    args.parse().map(Command::Read).map_err(|e| usage_error(e, "read"))
                }
            }
            "update" => parse_update(args),
            "delete" => {
                let target = required(args, "delete")?;
                target.parse().map(Command::Delete).map_err(|e| usage_error(e, "delete"))
            }
            "search" => required(args, "search").map(Command::Search),
            "compact" => {
                if args.is_empty() {
                    Ok(Command::Compact(EntryRange::full()))
                } else {
                    args.parse().map(Command::Compact).map_err(|e| usage_error(e, "compact"))
                }
            }
            "stats" => Ok(Command::Stats),
            "clear" => Ok(Command::Clear),
            "save" => required(args, "save").map(|p| Command::Save(PathBuf::from(p))),
            "load" => required(args, "load").map(|p| Command::Load(PathBuf::from(p))),
            "rag" => required(args, "rag").map(Command::Rag),
            "visualize" | "viz" => parse_visualize(args),
            "help" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            other => Err(Error::validation(format!(
                "Unknown command: {other}. Type 'help' for the command list."
            ))),
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Usage line for a command word.
pub fn usage(command: &str) -> &'static str {
    match command {
        "chat" => "chat <message>",
        "create" => "create <role> <content>",
        "read" => "read [index|start:end|role]",
        "update" => "update <index> <role|content|metadata> <value>",
        "delete" => "delete <index|start:end|role>",
        "search" => "search <query>",
        "compact" => "compact [start:end]",
        "save" => "save <path>",
        "load" => "load <path>",
        "rag" => "rag <query>",
        "visualize" => "visualize [output] [start:end]",
        _ => "help",
    }
}

fn usage_error(cause: impl std::fmt::Display, command: &str) -> Error {
    Error::validation(format!("{cause}\nUsage: {}", usage(command)))
}

fn missing(command: &str) -> Error {
    Error::validation(format!("Usage: {}", usage(command)))
}

fn required(args: &str, command: &str) -> Result<String> {
    if args.is_empty() {
        Err(missing(command))
    } else {
        Ok(args.to_string())
    }
}

fn parse_create(args: &str) -> Result<Command> {
    let (role, content) = args
        .split_once(char::is_whitespace)
        .ok_or_else(|| missing("create"))?;
    let role = role.parse().map_err(|e| usage_error(e, "create"))?;
    let content = content.trim();
    if content.is_empty() {
        return Err(missing("create"));
    }
    Ok(Command::Create {
        role,
        content: content.to_string(),
    })
}

fn parse_update(args: &str) -> Result<Command> {
    let mut parts = args.splitn(3, char::is_whitespace);
    let (Some(index), Some(field), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(missing("update"));
    };
    let value = value.trim();
    if value.is_empty() {
        return Err(missing("update"));
    }

    let index = index
        .parse::<usize>()
        .map_err(|_| usage_error(format!("Invalid index '{index}'"), "update"))?;

    let update = match field.to_ascii_lowercase().as_str() {
        "role" => EntryUpdate::role(value.parse().map_err(|e| usage_error(e, "update"))?),
        "content" => EntryUpdate::content(value),
        "metadata" => match serde_json::from_str::<Value>(value) {
            Ok(Value::Object(map)) => EntryUpdate::metadata(map),
            Ok(_) => return Err(usage_error("Metadata must be a JSON object", "update")),
            Err(e) => return Err(usage_error(format!("Invalid JSON for metadata: {e}"), "update")),
        },
        other => {
            return Err(usage_error(
                format!("Unknown field '{other}' (expected role, content or metadata)"),
                "update",
            ));
        }
    };

    Ok(Command::Update { index, update })
}

fn parse_visualize(args: &str) -> Result<Command> {
    let mut output = None;
    let mut range = None;

    for part in args.split_whitespace() {
        // A known image or DOT extension wins, so `out:v1.png` is a path.
        let is_output = OutputFormat::from_path(Path::new(part)).is_ok();
        if !is_output && part.contains(':') {
            if range.is_some() {
                return Err(usage_error("More than one range given", "visualize"));
            }
            range = Some(part.parse().map_err(|e| usage_error(e, "visualize"))?);
        } else {
            if output.is_some() {
                return Err(usage_error("More than one output path given", "visualize"));
            }
            output = Some(PathBuf::from(part));
        }
    }

    Ok(Command::Visualize {
        output,
        range: range.unwrap_or_else(EntryRange::full),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use smithers_core::ErrorKind;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap()
    }

    fn parse_err(line: &str) -> Error {
        Command::parse(line).unwrap_err()
    }

    #[test]
    fn chat_keeps_message_text() {
        assert_eq!(parse("chat what is 2+2?"), Command::Chat("what is 2+2?".into()));
        assert_eq!(parse("CHAT  Hi"), Command::Chat("Hi".into()));
    }

    #[test]
    fn create_takes_role_and_content() {
        assert_eq!(
            parse("create system You are terse."),
            Command::Create {
                role: Role::System,
                content: "You are terse.".into()
            }
        );
        assert_eq!(parse_err("create robot hi").kind(), ErrorKind::Validation);
        assert!(parse_err("create user").to_string().contains("Usage: create"));
    }

    #[test]
    fn read_and_delete_selectors() {
        assert_eq!(parse("read"), Command::Read(Selector::all()));
        assert_eq!(parse("read 2"), Command::Read(Selector::Index(2)));
        assert_eq!(parse("read 1:3"), Command::Read(Selector::Range(EntryRange::new(1, 3))));
        assert_eq!(parse("read user"), Command::Read(Selector::Role(Role::User)));
        assert_eq!(parse("delete system"), Command::Delete(Selector::Role(Role::System)));
        assert!(parse_err("delete").to_string().contains("Usage: delete"));
        assert!(parse_err("read -1").to_string().contains("non-negative"));
    }

    #[test]
    fn update_fields() {
        assert_eq!(
            parse("update 0 content new text here"),
            Command::Update {
                index: 0,
                update: EntryUpdate::content("new text here")
            }
        );
        assert_eq!(
            parse("update 1 role assistant"),
            Command::Update {
                index: 1,
                update: EntryUpdate::role(Role::Assistant)
            }
        );

        let Command::Update { update, .. } = parse(r#"update 2 metadata {"tag": "x"}"#) else {
            panic!("expected update");
        };
        assert_eq!(update.metadata.unwrap()["tag"], "x");
    }

    #[test]
    fn update_rejects_bad_input() {
        assert!(parse_err("update 0 metadata not-json").to_string().contains("Invalid JSON"));
        assert!(parse_err("update 0 metadata [1,2]").to_string().contains("JSON object"));
        assert!(parse_err("update x content hi").to_string().contains("Invalid index"));
        assert!(parse_err("update 0 colour red").to_string().contains("Unknown field"));
        assert!(parse_err("update 0 content").to_string().contains("Usage: update"));
    }

    #[test]
    fn compact_defaults_to_everything() {
        assert_eq!(parse("compact"), Command::Compact(EntryRange::full()));
        assert_eq!(parse("compact 0:2"), Command::Compact(EntryRange::new(0, 2)));
        assert_eq!(parse_err("compact 3:1").kind(), ErrorKind::Validation);
    }

    #[test]
    fn visualize_accepts_path_and_range_in_any_order() {
        assert_eq!(
            parse("viz 2:5 out.png"),
            Command::Visualize {
                output: Some(PathBuf::from("out.png")),
                range: EntryRange::new(2, 5)
            }
        );
        assert_eq!(
            parse("visualize"),
            Command::Visualize {
                output: None,
                range: EntryRange::full()
            }
        );
        assert!(parse_err("viz a.png b.png").to_string().contains("More than one"));
    }

    #[test]
    fn visualize_output_with_colon_is_a_path() {
        assert_eq!(
            parse("visualize out:v1.png 0:2"),
            Command::Visualize {
                output: Some(PathBuf::from("out:v1.png")),
                range: EntryRange::new(0, 2)
            }
        );
        assert_eq!(
            parse("viz run:3.gv"),
            Command::Visualize {
                output: Some(PathBuf::from("run:3.gv")),
                range: EntryRange::full()
            }
        );
        assert_eq!(parse_err("viz 1:x").kind(), ErrorKind::Validation);
    }

    #[test]
    fn simple_commands_and_exit_aliases() {
        assert_eq!(parse("stats"), Command::Stats);
        assert_eq!(parse("Clear"), Command::Clear);
        assert_eq!(parse("help"), Command::Help);
        for word in ["exit", "quit", "q", "QUIT"] {
            assert_eq!(parse(word), Command::Exit);
        }
        assert_eq!(parse("   "), Command::Empty);
        assert_eq!(parse("save /tmp/ctx.json"), Command::Save("/tmp/ctx.json".into()));
        assert_eq!(parse("rag deploy key"), Command::Rag("deploy key".into()));
    }

    #[test]
    fn unknown_command_is_a_validation_error() {
        let err = parse_err("dance now");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Unknown command: dance"));
    }
}
