use std::path::{Path, PathBuf};

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            // Keep alphanumeric characters, spaces, hyphens, underscores, and dots
            c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Append `.md` unless the path already ends with it (case-insensitive)
pub fn ensure_md_extension(path: &Path) -> PathBuf {
    let has_md = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false);
    if has_md {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_os_string();
    name.push(".md");
    PathBuf::from(name)
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
