//! Projection of a simplified batch onto the files it leaves behind

use crate::compact::compact;
use crate::model::{File, FileAction};

/// The file snapshots carried by `simplified`, in order.
///
/// No uniqueness is enforced: a path whose content changed inside the batch
/// can appear once per surviving `(path, hash)` bucket.
pub fn materialize(simplified: &[FileAction]) -> Vec<File> {
    simplified.iter().map(|action| action.file.clone()).collect()
}

/// Compact a raw batch and project the result.
pub fn compute_files(actions: &[FileAction]) -> Vec<File> {
    materialize(&compact(actions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materialize_preserves_order() {
        let batch = vec![
            FileAction::create(File::new("b.txt", "H2")),
            FileAction::create(File::new("a.txt", "H1")),
        ];
        let files = materialize(&batch);

        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["b.txt", "a.txt"]);
    }

    #[test]
    fn compute_files_drops_cancelled_pairs() {
        let batch = vec![
            FileAction::create(File::new("a.txt", "H1")),
            FileAction::delete(File::new("a.txt", "H1")),
            FileAction::create(File::new("a.txt", "H2")),
        ];
        let files = compute_files(&batch);

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].hash, "H2");
    }

    #[test]
    fn content_change_yields_both_snapshots() {
        // Old content deleted, new content created: two buckets, one path
        let batch = vec![
            FileAction::delete(File::new("a.txt", "H1")),
            FileAction::create(File::new("a.txt", "H2")),
        ];
        assert_eq!(compute_files(&batch).len(), 2);
    }
}
