// src/lib.rs

pub mod http;
pub mod matching;
pub mod platforms;
pub mod services;
pub mod tasks;
pub mod utils;
pub mod voice;

pub use zyra_common::error::Error;
pub use http::{DefaultHttpClient, HttpClient};
