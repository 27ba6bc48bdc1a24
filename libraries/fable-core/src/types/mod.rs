//! Domain types shared across FableFlow crates

mod book;
mod metadata;
mod session;

pub use book::{Book, BookId, NewBook};
pub use metadata::BookMetadata;
pub use session::{
    ImportSession, QuarantineReason, QuarantinedBook, SessionStatus, SessionSummary,
};
