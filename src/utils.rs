//! # Utility Functions Module
//!
//! Small helpers shared by discovery, classification and the git client.

use std::path::Path;

/// Lowercased extension of a path including the leading dot (`.png`).
///
/// Returns `None` when the file name has no extension. Dotfiles such as
/// `.gitkeep` have no extension either.
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Whether a file name is hidden (starts with `.`)
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Converts any iterable of string-like items to `Vec<String>`.
///
/// ```ignore
/// let args = to_string_vec(["push", remote, branch]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Builds an argument vector from mixed string-like values.
///
/// ```ignore
/// let args = args!["commit", "-m", message];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec([$($item.to_string()),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension(Path::new("photo.PNG")), Some(".png".to_string()));
        assert_eq!(dotted_extension(Path::new("archive.tar.gz")), Some(".gz".to_string()));
        assert_eq!(dotted_extension(Path::new("README")), None);
        assert_eq!(dotted_extension(Path::new(".gitkeep")), None);
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new("/staging/.DS_Store")));
        assert!(!is_hidden(Path::new("/staging/clip.mp4")));
    }

    #[test]
    fn test_args_macro() {
        let message = String::from("sys-auto: ingest");
        let result = args!["commit", "-m", message];
        assert_eq!(result, vec!["commit", "-m", "sys-auto: ingest"]);
    }

    #[test]
    fn test_to_string_vec_empty() {
        let result: Vec<String> = to_string_vec(Vec::<&str>::new());
        assert!(result.is_empty());
    }
}
