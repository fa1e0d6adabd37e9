pub mod config;
pub mod digest;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod garble;
pub mod normalize;
pub mod render;

pub use digest::{Digester, PageDigest, Stage};
pub use error::DigestError;
