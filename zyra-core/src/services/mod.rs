pub mod discord;
pub mod music;
