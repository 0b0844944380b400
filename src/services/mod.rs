pub mod entry;

pub use entry::EntrySession;
