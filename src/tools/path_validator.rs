use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// 展開 `~` 並轉為絕對路徑（不要求路徑存在）
pub fn resolve_user_path(raw: &Path) -> Result<PathBuf> {
    let expanded = expand_home(raw);
    std::path::absolute(&expanded)
        .with_context(|| format!("無法解析路徑: {}", raw.display()))
}

fn expand_home(raw: &Path) -> PathBuf {
    let Ok(rest) = raw.strip_prefix("~") else {
        return raw.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => raw.to_path_buf(),
    }
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("無法建立資料夾: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_relative_path_is_absolute() {
        let resolved = resolve_user_path(Path::new("some/relative/dir")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/relative/dir"));
    }

    #[test]
    fn test_resolve_home_prefix() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let resolved = resolve_user_path(Path::new("~/videos")).unwrap();
        assert_eq!(resolved, std::path::absolute(home.join("videos")).unwrap());
    }

    #[test]
    fn test_tilde_inside_name_is_untouched() {
        let resolved = resolve_user_path(Path::new("/tmp/~backup")).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/~backup"));
    }

    #[test]
    fn test_ensure_directory_exists_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        ensure_directory_exists(&nested).unwrap();
        ensure_directory_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
