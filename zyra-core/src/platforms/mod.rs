pub mod discord;
pub mod genius;
pub mod spotify;
pub mod youtube;
