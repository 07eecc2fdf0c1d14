pub mod client;
pub mod models;

pub use client::{ProxyClient, TrackSearch};
pub use models::{Artist, SearchResponse, Track};
