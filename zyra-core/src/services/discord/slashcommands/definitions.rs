// File: zyra-core/src/services/discord/slashcommands/definitions.rs

use twilight_model::application::command::{Command, CommandType};
use twilight_util::builder::command::{CommandBuilder, IntegerBuilder, StringBuilder, SubCommandBuilder};

fn chat(name: &str, description: &str) -> CommandBuilder {
    CommandBuilder::new(name, description, CommandType::ChatInput)
}

fn position(name: &str, description: &str) -> IntegerBuilder {
    IntegerBuilder::new(name, description).required(true).min_value(1)
}

/// Every global command, ready for `set_global_commands`.
/// In Twilight 0.16, `build()` returns a `Command` directly.
pub fn all_commands() -> Vec<Command> {
    vec![
        chat("play", "Play a song or playlist from YouTube or Spotify")
            .option(
                StringBuilder::new("query", "Song name, YouTube URL or Spotify track/playlist/album URL")
                    .required(true),
            )
            .build(),
        chat("join", "Join your voice channel").build(),
        chat("pause", "Pause the current song").build(),
        chat("resume", "Resume the paused song").build(),
        chat("skip", "Skip the current song").build(),
        chat("skipto", "Skip to a position in the queue")
            .option(position("position", "Queue position to jump to"))
            .build(),
        chat("stop", "Stop the music and leave the voice channel").build(),
        chat("queue", "Show the music queue")
            .option(IntegerBuilder::new("page", "Page number").min_value(1))
            .build(),
        chat("nowplaying", "Show the song that is playing").build(),
        chat("volume", "Set the playback volume")
            .option(
                IntegerBuilder::new("level", "Volume from 0 to 100")
                    .required(true)
                    .min_value(0)
                    .max_value(100),
            )
            .build(),
        chat("loop", "Set the loop mode")
            .option(
                StringBuilder::new("mode", "Loop mode")
                    .required(true)
                    .choices([("Off", "off"), ("Song", "song"), ("Queue", "queue")]),
            )
            .build(),
        chat("shuffle", "Shuffle the upcoming songs").build(),
        chat("remove", "Remove a song from the queue")
            .option(position("position", "Queue position to remove"))
            .build(),
        chat("move", "Move a song to another position")
            .option(position("from", "Current position"))
            .option(position("to", "New position"))
            .build(),
        chat("clear", "Remove every upcoming song").build(),
        chat("search", "Search YouTube and pick a result")
            .option(StringBuilder::new("query", "Song to search for").required(true))
            .build(),
        chat("spotify", "Spotify integration")
            .option(SubCommandBuilder::new("status", "Check the Spotify API connection"))
            .build(),
        chat("lyrics", "Get lyrics for the current song or search")
            .option(StringBuilder::new("query", "Song name to search (optional)"))
            .build(),
        chat("help", "List the music commands").build(),
    ]
}
