pub mod notifier;
pub mod panel;
pub mod runtime;
pub mod voice;

pub use notifier::ChannelNotifier;
pub use runtime::DiscordPlatform;
pub use voice::SongbirdGateway;
