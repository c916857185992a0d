pub mod locator;
pub mod registry;
pub mod service;
pub mod session_queue;

pub use locator::{LocatorConfig, MediaLocator};
pub use registry::SessionRegistry;
pub use service::{EnqueueOutcome, MusicConfig, MusicService};
pub use session_queue::{QueueSettings, SessionQueue};
