pub mod config;
pub mod error;
pub mod formats;
pub mod handlers;
pub mod pid;
pub mod service;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use pid::Pid;
pub use service::RoiService;
