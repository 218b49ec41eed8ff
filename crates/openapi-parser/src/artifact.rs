//! JSON artifacts written for inspection and debugging

use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Write a value as pretty-printed JSON, atomically via a temp file
pub async fn write_json_artifact<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> std::io::Result<()> {
    let contents = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, &contents).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!("Wrote artifact to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("artifact.json");

        write_json_artifact(&path, &serde_json::json!({"ok": true}))
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["ok"], true);
        assert!(!path.with_extension("tmp").exists());
    }
}
