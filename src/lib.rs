pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod history;
pub mod middleware;
pub mod response;
pub mod server;
pub mod shuffle;
pub mod validation;

pub use config::Config;
pub use error::{Result, ShuffleError};
pub use history::{HistoryStore, InMemoryHistory, JsonFileHistory};
pub use response::ShuffleResponse;
pub use server::create_app;
pub use shuffle::{ShuffleGenerator, ShuffleType};
