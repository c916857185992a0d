// File: zyra-core/src/services/discord/slashcommands/command.rs

use twilight_model::application::interaction::application_command::{CommandDataOption, CommandOptionValue};

use zyra_common::models::RepeatMode;

use crate::Error;

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicCommand {
    Play { query: String },
    Join,
    Pause,
    Resume,
    Skip,
    SkipTo { position: usize },
    Stop,
    Queue { page: usize },
    NowPlaying,
    Volume { level: i64 },
    Loop { mode: RepeatMode },
    Shuffle,
    Remove { position: usize },
    Move { from: usize, to: usize },
    Clear,
    Search { query: String },
    SpotifyStatus,
    Lyrics { query: Option<String> },
    Help,
}

impl MusicCommand {
    pub fn parse(name: &str, options: &[CommandDataOption]) -> Result<Self, Error> {
        let cmd = match name {
            "play" => MusicCommand::Play {
                query: string_option(options, "query")?,
            },
            "join" => MusicCommand::Join,
            "pause" => MusicCommand::Pause,
            "resume" => MusicCommand::Resume,
            "skip" => MusicCommand::Skip,
            "skipto" => MusicCommand::SkipTo {
                position: position_option(options, "position")?,
            },
            "stop" => MusicCommand::Stop,
            "queue" => MusicCommand::Queue {
                page: optional_integer(options, "page").map_or(1, |p| p.max(1) as usize),
            },
            "nowplaying" => MusicCommand::NowPlaying,
            "volume" => MusicCommand::Volume {
                level: integer_option(options, "level")?,
            },
            "loop" => MusicCommand::Loop {
                mode: string_option(options, "mode")?.parse()?,
            },
            "shuffle" => MusicCommand::Shuffle,
            "remove" => MusicCommand::Remove {
                position: position_option(options, "position")?,
            },
            "move" => MusicCommand::Move {
                from: position_option(options, "from")?,
                to: position_option(options, "to")?,
            },
            "clear" => MusicCommand::Clear,
            "search" => MusicCommand::Search {
                query: string_option(options, "query")?,
            },
            "spotify" => match options.first() {
                Some(CommandDataOption {
                    name,
                    value: CommandOptionValue::SubCommand(_),
                }) if name == "status" => MusicCommand::SpotifyStatus,
                _ => return Err(Error::Parse("Unknown /spotify subcommand".into())),
            },
            "lyrics" => MusicCommand::Lyrics {
                query: optional_string(options, "query"),
            },
            "help" => MusicCommand::Help,
            other => return Err(Error::Parse(format!("Unrecognized command: {other}"))),
        };
        Ok(cmd)
    }

    /// Commands that talk to the catalogs reply late.
    pub fn defers(&self) -> bool {
        matches!(
            self,
            MusicCommand::Play { .. }
                | MusicCommand::Search { .. }
                | MusicCommand::SpotifyStatus
                | MusicCommand::Lyrics { .. }
        )
    }
}

fn find<'a>(options: &'a [CommandDataOption], name: &str) -> Option<&'a CommandOptionValue> {
    options.iter().find(|o| o.name == name).map(|o| &o.value)
}

fn optional_string(options: &[CommandDataOption], name: &str) -> Option<String> {
    match find(options, name) {
        Some(CommandOptionValue::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn string_option(options: &[CommandDataOption], name: &str) -> Result<String, Error> {
    match find(options, name) {
        Some(CommandOptionValue::String(s)) => Ok(s.clone()),
        _ => Err(Error::Parse(format!("missing option '{name}'"))),
    }
}

fn optional_integer(options: &[CommandDataOption], name: &str) -> Option<i64> {
    match find(options, name) {
        Some(CommandOptionValue::Integer(i)) => Some(*i),
        _ => None,
    }
}

fn integer_option(options: &[CommandDataOption], name: &str) -> Result<i64, Error> {
    optional_integer(options, name).ok_or_else(|| Error::Parse(format!("missing option '{name}'")))
}

/// Positions are 1-based; zero and negatives are out of range.
fn position_option(options: &[CommandDataOption], name: &str) -> Result<usize, Error> {
    let raw = integer_option(options, name)?;
    usize::try_from(raw)
        .ok()
        .filter(|p| *p >= 1)
        .ok_or_else(|| Error::OutOfRange(format!("Invalid position {raw}!")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(name: &str, value: CommandOptionValue) -> CommandDataOption {
        CommandDataOption {
            name: name.into(),
            value,
        }
    }

    #[test]
    fn parses_options() {
        assert_eq!(
            MusicCommand::parse("play", &[opt("query", CommandOptionValue::String("lofi".into()))]).unwrap(),
            MusicCommand::Play { query: "lofi".into() }
        );
        assert_eq!(
            MusicCommand::parse(
                "move",
                &[opt("from", CommandOptionValue::Integer(3)), opt("to", CommandOptionValue::Integer(1))]
            )
            .unwrap(),
            MusicCommand::Move { from: 3, to: 1 }
        );
        assert_eq!(
            MusicCommand::parse("loop", &[opt("mode", CommandOptionValue::String("queue".into()))]).unwrap(),
            MusicCommand::Loop { mode: RepeatMode::All }
        );
        assert_eq!(MusicCommand::parse("queue", &[]).unwrap(), MusicCommand::Queue { page: 1 });
        assert_eq!(
            MusicCommand::parse("spotify", &[opt("status", CommandOptionValue::SubCommand(vec![]))]).unwrap(),
            MusicCommand::SpotifyStatus
        );
        assert_eq!(MusicCommand::parse("lyrics", &[]).unwrap(), MusicCommand::Lyrics { query: None });
        assert_eq!(
            MusicCommand::parse("lyrics", &[opt("query", CommandOptionValue::String(" hello ".into()))]).unwrap(),
            MusicCommand::Lyrics {
                query: Some("hello".into())
            }
        );
        assert!(MusicCommand::parse("lyrics", &[]).unwrap().defers());
    }

    #[test]
    fn volume_range_is_left_to_the_queue() {
        assert_eq!(
            MusicCommand::parse("volume", &[opt("level", CommandOptionValue::Integer(150))]).unwrap(),
            MusicCommand::Volume { level: 150 }
        );
    }

    #[test]
    fn rejects_bad_positions_and_unknown_commands() {
        let err = MusicCommand::parse("skipto", &[opt("position", CommandOptionValue::Integer(0))]).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
        let err = MusicCommand::parse("remove", &[opt("position", CommandOptionValue::Integer(-2))]).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
        assert!(MusicCommand::parse("karaoke", &[]).is_err());
        assert!(MusicCommand::parse("play", &[]).is_err());
    }
}
