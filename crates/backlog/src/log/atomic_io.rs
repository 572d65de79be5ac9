use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes `text` beside `path` and renames it over `path`.
///
/// On Unix the rename replaces the old file in one step, so a reader sees one
/// complete flush or the next. Windows will not rename onto an existing file;
/// there the old log is removed first and is briefly absent.
pub(crate) fn replace_log_file(path: &Path, text: &str) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let staged = staged_path(path);
    let result = write_staged(&staged, text).and_then(|()| rename_over(&staged, path));
    if result.is_err() {
        let _ = fs::remove_file(&staged);
    }
    result
}

fn write_staged(staged: &Path, text: &str) -> io::Result<()> {
    let mut file = File::create(staged)?;
    file.write_all(text.as_bytes())?;
    file.sync_data()
}

#[cfg(not(windows))]
fn rename_over(staged: &Path, path: &Path) -> io::Result<()> {
    fs::rename(staged, path)
}

#[cfg(windows)]
fn rename_over(staged: &Path, path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(error) if error.kind() != io::ErrorKind::NotFound => return Err(error),
        _ => {}
    }
    fs::rename(staged, path)
}

/// Hidden sibling of `path`, so a half-written flush never shows up as a log.
fn staged_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| super::LOG_FILE_NAME.to_string());
    path.with_file_name(format!(".{name}.staged"))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn replace_overwrites_previous_flush() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("log.txt");

        replace_log_file(&path, "first\nsecond\n").expect("first write");
        replace_log_file(&path, "third\n").expect("second write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "third\n");
        assert!(!staged_path(&path).exists());
    }

    #[test]
    fn replace_creates_missing_parent_dirs() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("nested").join("dir").join("log.txt");

        replace_log_file(&path, "x\n").expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "x\n");
    }

    #[test]
    fn failed_rename_leaves_no_staged_file() {
        let temp = TempDir::new().expect("temp dir");
        // A directory in the way makes the rename fail.
        let path = temp.path().join("log.txt");
        fs::create_dir(&path).expect("blocking dir");
        fs::write(path.join("keep"), "x").expect("fill dir");

        assert!(replace_log_file(&path, "lost\n").is_err());
        assert!(!staged_path(&path).exists());
    }

    #[cfg(unix)]
    #[test]
    fn open_reader_keeps_the_previous_flush() {
        use std::io::Read;

        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("log.txt");
        replace_log_file(&path, "old\n").expect("first write");
        let mut reader = File::open(&path).expect("open");

        replace_log_file(&path, "new\n").expect("second write");

        let mut seen = String::new();
        reader.read_to_string(&mut seen).expect("read");
        assert_eq!(seen, "old\n");
        assert_eq!(fs::read_to_string(&path).expect("read"), "new\n");
    }
}
