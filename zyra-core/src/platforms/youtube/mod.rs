pub mod catalog;
pub mod stream;
pub mod urls;
pub mod ytdlp;

pub use catalog::YouTubeCatalog;
pub use stream::YtDlpPipeline;
pub use ytdlp::YtDlp;
