use anyhow::{Result, bail};
use std::path::Path;

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_rejects_missing_and_files() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("f.mp4");
        std::fs::write(&file, "x").unwrap();

        assert!(validate_directory_exists(temp_dir.path()).is_ok());
        assert!(validate_directory_exists(&temp_dir.path().join("missing")).is_err());
        assert!(validate_directory_exists(&file).is_err());
    }
}
