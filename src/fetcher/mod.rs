pub mod client;
pub mod decode;
pub mod errors;
pub mod types;

pub use client::{ABOUT_PATHS, Fetcher, MAX_BODY_SIZE, browser_headers};
pub use errors::FetchError;
pub use types::{Charset, FetchResult};
