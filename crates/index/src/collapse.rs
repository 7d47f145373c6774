//! Checksum-collapse of a path's version history.
//!
//! Every backup run writes a content row for each file it sees, even when
//! the file hasn't changed since the previous run. Presenting each of those
//! rows as a separate version would list identical content several times,
//! so consecutive rows (in timestamp order) that share a path and checksum
//! are merged into one version stamped with the earliest timestamp of the
//! streak.
//!
//! Only *consecutive* duplicates merge. Content that changes and later
//! changes back (a revert) is a new version, because the archive's state
//! genuinely differed in between.

use crate::Entry;

/// Collapse consecutive same-checksum entries of the same path.
///
/// The input must be grouped by path and ordered by timestamp ascending
/// within each path, which is the order the store returns rows in. The
/// output keeps that order. Each surviving entry carries the smallest
/// timestamp of the streak it represents; its archive directory is taken
/// from the first entry of the streak.
///
/// # Examples
///
/// ```
/// use rewind_index::Entry;
/// use rewind_index::collapse::collapse;
///
/// let history = vec![
///     Entry::new("/b.txt", 100, "/archive/1", "aaa"),
///     Entry::new("/b.txt", 200, "/archive/1", "aaa"),
///     Entry::new("/b.txt", 300, "/archive/3", "bbb"),
/// ];
/// let versions = collapse(history);
/// assert_eq!(versions.len(), 2);
/// assert_eq!(versions[0].timestamp, 100);
/// assert_eq!(versions[1].timestamp, 300);
/// ```
pub fn collapse(entries: impl IntoIterator<Item = Entry>) -> Vec<Entry> {
    let mut collapsed: Vec<Entry> = Vec::new();
    for entry in entries {
        match collapsed.last_mut() {
            Some(previous) if previous.path == entry.path && previous.checksum == entry.checksum => {
                previous.timestamp = previous.timestamp.min(entry.timestamp);
            },
            _ => collapsed.push(entry),
        }
    }
    collapsed
}
