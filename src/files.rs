// File I/O: reads and validates the source file before anything touches the
// network, and writes the obfuscated result once the response has parsed.
// Validation order matters: a file that is too large is rejected before we
// ever read it into memory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Largest input the service accepts (2 MiB).
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Inputs above this size still go through but get a warning line.
pub const LARGE_FILE_WARNING: u64 = 100 * 1024;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Input path is not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("File too large: {size} bytes (maximum: {max} bytes)")]
    TooLarge { size: u64, max: u64 },
    #[error("Input file is not valid UTF-8 text")]
    NotUtf8,
    #[error("Input file is empty")]
    Empty,
    #[error("Failed to read input file: {0}")]
    Io(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Permission denied writing to: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("Failed to write output file: {0}")]
    Io(#[source] io::Error),
}

/// Contents of a validated input file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub text: String,
    /// Size on disk in bytes.
    pub size: u64,
}

impl SourceFile {
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// Whether a file of `size` bytes deserves the large-file warning.
pub fn is_large(size: u64) -> bool {
    size > LARGE_FILE_WARNING
}

/// Check that `path` is an existing regular file no larger than
/// [`MAX_FILE_SIZE`], without reading it. Returns the size on disk.
pub fn check_input(path: &Path) -> Result<u64, InputError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(InputError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(InputError::Io(e)),
    };
    if !meta.is_file() {
        return Err(InputError::NotAFile(path.to_path_buf()));
    }

    let size = meta.len();
    if size > MAX_FILE_SIZE {
        return Err(InputError::TooLarge {
            size,
            max: MAX_FILE_SIZE,
        });
    }
    Ok(size)
}

/// Read a file that already passed [`check_input`]; the contents must be
/// non-empty UTF-8.
pub fn read_checked(path: &Path, size: u64) -> Result<SourceFile, InputError> {
    let bytes = fs::read(path).map_err(InputError::Io)?;
    let text = String::from_utf8(bytes).map_err(|_| InputError::NotUtf8)?;
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }

    debug!(path = %path.display(), size, "read input file");
    Ok(SourceFile { text, size })
}

/// Read `path` and check that it is an existing, non-empty UTF-8 file no
/// larger than [`MAX_FILE_SIZE`].
pub fn read_input(path: &Path) -> Result<SourceFile, InputError> {
    let size = check_input(path)?;
    read_checked(path, size)
}

/// Write `text` to `path`, creating parent directories first. Existing files
/// are overwritten. Returns the number of bytes written.
pub fn write_output(path: &Path, text: &str) -> Result<u64, OutputError> {
    let classify = |e: io::Error| match e.kind() {
        io::ErrorKind::PermissionDenied => OutputError::PermissionDenied(path.to_path_buf()),
        _ => OutputError::Io(e),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(classify)?;
    }
    fs::write(path, text).map_err(classify)?;

    let written = text.len() as u64;
    debug!(path = %path.display(), written, "wrote output file");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("script.py");
        fs::write(&path, "print('hi')\nx = 1\n").unwrap();

        let source = read_input(&path).unwrap();
        assert_eq!(source.text, "print('hi')\nx = 1\n");
        assert_eq!(source.size, 18);
        assert_eq!(source.line_count(), 2);
        assert!(!is_large(source.size));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = read_input(&dir.path().join("absent.py")).unwrap_err();
        assert!(matches!(err, InputError::NotFound(_)));
        assert!(err.to_string().starts_with("Input file not found: "));
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        let err = read_input(dir.path()).unwrap_err();
        assert!(matches!(err, InputError::NotAFile(_)));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.py");
        fs::write(&path, vec![b'a'; MAX_FILE_SIZE as usize + 1]).unwrap();

        let err = read_input(&path).unwrap_err();
        match err {
            InputError::TooLarge { size, max } => {
                assert_eq!(size, MAX_FILE_SIZE + 1);
                assert_eq!(max, MAX_FILE_SIZE);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn file_at_limit_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edge.py");
        fs::write(&path, vec![b'a'; MAX_FILE_SIZE as usize]).unwrap();

        let source = read_input(&path).unwrap();
        assert_eq!(source.size, MAX_FILE_SIZE);
        assert!(is_large(source.size));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bin.py");
        fs::write(&path, [0x66, 0x6f, 0xff, 0xfe, 0x6f]).unwrap();

        let err = read_input(&path).unwrap_err();
        assert!(matches!(err, InputError::NotUtf8));
    }

    #[test]
    fn whitespace_only_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.py");
        fs::write(&path, "  \n\t\n").unwrap();

        let err = read_input(&path).unwrap_err();
        assert!(matches!(err, InputError::Empty));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.py");
        let text = "exec(__import__('zlib').decompress(b'\\x78'))\nüñí\n";

        let written = write_output(&path, text).unwrap();
        assert_eq!(written, text.len() as u64);
        assert_eq!(fs::read(&path).unwrap(), text.as_bytes());
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.py");
        fs::write(&path, "old contents that are longer").unwrap();

        write_output(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn check_input_does_not_look_at_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.py");
        fs::write(&path, b"caf\xe9\n").unwrap();

        assert_eq!(check_input(&path).unwrap(), 5);
        assert!(matches!(read_checked(&path, 5), Err(InputError::NotUtf8)));
    }

    #[cfg(unix)]
    #[test]
    fn write_into_read_only_directory_is_permission_denied() {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};

        let dir = tempdir().unwrap();
        // Root ignores directory permissions.
        if fs::metadata(dir.path()).unwrap().uid() == 0 {
            return;
        }
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let path = locked.join("out.py");
        let result = write_output(&path, "code");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err, OutputError::PermissionDenied(_)), "{err:?}");
        assert_eq!(
            err.to_string(),
            format!("Permission denied writing to: {}", path.display())
        );
        assert!(!path.exists());
    }

    #[test]
    fn write_under_a_file_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let err = write_output(&blocker.join("out.py"), "code").unwrap_err();
        assert!(matches!(err, OutputError::Io(_)));
        assert!(err.to_string().starts_with("Failed to write output file: "));
    }
}
