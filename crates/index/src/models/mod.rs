mod entry;
mod run;

pub use self::entry::Entry;
pub(crate) use self::entry::EntryRow;
pub use self::run::RunInfo;
pub(crate) use self::run::RunRow;
