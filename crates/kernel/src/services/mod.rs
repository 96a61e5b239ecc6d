//! Directory services: catalog, reviews and quote requests.

pub mod catalog;
pub mod directory;
pub mod quotes;
pub mod reviews;

pub use catalog::{Catalog, CatalogFile};
pub use directory::Directory;
pub use quotes::{QuoteError, QuoteInbox};
pub use reviews::{ReviewError, ReviewLedger};
