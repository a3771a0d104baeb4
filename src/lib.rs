//! Resolve TeraBox share links to downloadable files.
//!
//! ```no_run
//! use teradl::{Resolve, ShareLink, Terabox};
//!
//! # async fn run() -> teradl::TeraResult<()> {
//! let link = ShareLink::parse("https://terabox.com/s/1AbC123")?;
//! let file = Terabox::new().resolve(&link).await?;
//! println!("{:?} ({:?} bytes)", file.filename, file.size);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod descriptor;
pub mod error;
pub mod limits;
pub mod resolver;
pub mod settings;
pub mod strategy;
pub mod transfer;
pub mod utils;

pub use classify::{is_share_link, ShareLink};
pub use descriptor::{FileDescriptor, Provenance};
pub use error::{Error, ErrorKind};
pub use limits::Limits;
pub use resolver::{ResolverConfig, Terabox};
pub use transfer::{Downloaded, Progress, TransferConfig};

pub type TeraResult<T = FileDescriptor> = Result<T, Error>;

#[async_trait::async_trait]
pub trait Resolve {
    async fn resolve(&self, link: &ShareLink) -> TeraResult;
}

pub trait AsClient {
    fn client(&self) -> &utils::Client;
    fn client_mut(&mut self) -> &mut utils::Client;
}
