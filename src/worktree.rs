use std::{
    fs::{self, create_dir_all, read_to_string},
    io::ErrorKind,
    path::PathBuf,
};

/// The working directory whose files get staged, committed and checked out.
///
/// Paths handed to it are interpreted relative to its root.
#[derive(Debug, Clone)]
pub struct WorkTree {
    root: PathBuf,
}

impl WorkTree {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Whether `path` names a regular file.
    pub fn contains(&self, path: &str) -> std::io::Result<bool> {
        match fs::metadata(self.root.join(path)) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Reads the text of `path`, or `None` if it is no longer a regular file.
    pub fn read(&self, path: &str) -> std::io::Result<Option<String>> {
        if !self.contains(path)? {
            return Ok(None);
        }
        match read_to_string(self.root.join(path)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Overwrites `path` with `content`, creating parent directories as needed.
    pub fn write(&self, path: &str, content: &str) -> std::io::Result<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            create_dir_all(parent)?;
        }
        fs::write(full, content)
    }
}

#[test]
fn test_work_tree() {
    let tempdir = tempfile::tempdir().unwrap();
    let tree = WorkTree::new(tempdir.path().into());
    assert!(!tree.contains("nested/a.txt").unwrap());
    assert!(!tree.contains(".").unwrap());
    assert_eq!(tree.read("nested/a.txt").unwrap(), None);
    assert_eq!(tree.read(".").unwrap(), None);

    tree.write("nested/a.txt", "hi").unwrap();
    assert!(tree.contains("nested/a.txt").unwrap());
    assert_eq!(tree.read("nested/a.txt").unwrap().as_deref(), Some("hi"));

    tree.write("nested/a.txt", "bye").unwrap();
    assert_eq!(tree.read("nested/a.txt").unwrap().as_deref(), Some("bye"));
}
