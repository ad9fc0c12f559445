// ==========================================
// 吊索具智能柜管理系统 - 员工照片存储
// ==========================================
// 流程:
//   上传 → 写入暂存目录 (默认 temp.jpg)，计算 SHA-256，并复制到静态目录供预览
//   新增员工 → 暂存的 temp.jpg 更名为 {staff_id:06}.jpg 并发布到静态目录
// 目录均由构造参数传入
// ==========================================

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 未指定文件名时的暂存文件名
pub const STAGED_PHOTO_NAME: &str = "temp.jpg";

/// 发布后用于覆盖静态目录预览图的占位图
pub const DEFAULT_PHOTO_NAME: &str = "default.jpg";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("上传文件为空")]
    EmptyContent,

    #[error("文件名非法: {0}")]
    InvalidName(String),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// 暂存结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedPhoto {
    pub file_name: String,
    /// 内容摘要 (hex sha256)
    pub hash: String,
    pub size: u64,
}

pub struct PhotoStore {
    file_dir: PathBuf,
    temp_dir: PathBuf,
}

impl PhotoStore {
    pub fn new(file_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            file_dir: file_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn file_dir(&self) -> &Path {
        &self.file_dir
    }

    /// 员工照片在静态目录中的路径
    pub fn staff_photo_path(&self, staff_id: i64) -> PathBuf {
        self.file_dir.join(staff_photo_name(staff_id))
    }

    /// 暂存上传内容
    ///
    /// 先写入同目录下的临时文件再改名，避免读到写了一半的文件。
    pub fn stage(&self, content: &[u8], name: Option<&str>) -> StorageResult<StagedPhoto> {
        if content.is_empty() {
            return Err(StorageError::EmptyContent);
        }
        let file_name = sanitize_name(name.unwrap_or(STAGED_PHOTO_NAME))?;

        fs::create_dir_all(&self.temp_dir)?;
        let staged = self.temp_dir.join(&file_name);
        let partial = self
            .temp_dir
            .join(format!(".{}.part", uuid::Uuid::new_v4()));
        {
            let mut file = fs::File::create(&partial)?;
            file.write_all(content)?;
            file.sync_all()?;
        }
        fs::rename(&partial, &staged)?;

        fs::create_dir_all(&self.file_dir)?;
        fs::copy(&staged, self.file_dir.join(&file_name))?;

        let hash = format!("{:x}", Sha256::digest(content));
        tracing::info!("照片已暂存: file={}, hash={}", file_name, hash);

        Ok(StagedPhoto {
            file_name,
            hash,
            size: content.len() as u64,
        })
    }

    /// 将暂存的 temp.jpg 关联到员工
    ///
    /// # 返回
    /// - Ok(Some(path)): 发布后的静态文件路径
    /// - Ok(None): 没有暂存照片
    pub fn attach_staged(&self, staff_id: i64) -> StorageResult<Option<PathBuf>> {
        let staged = self.temp_dir.join(STAGED_PHOTO_NAME);
        if !staged.is_file() {
            return Ok(None);
        }

        let kept = self.temp_dir.join(staff_photo_name(staff_id));
        fs::rename(&staged, &kept)?;

        fs::create_dir_all(&self.file_dir)?;
        let published = self.staff_photo_path(staff_id);
        fs::copy(&kept, &published)?;

        // 静态目录的预览图恢复为占位图
        let placeholder = self.temp_dir.join(DEFAULT_PHOTO_NAME);
        if placeholder.is_file() {
            fs::copy(&placeholder, self.file_dir.join(STAGED_PHOTO_NAME))?;
        }

        tracing::info!("员工照片已发布: staff_id={}, path={}", staff_id, published.display());
        Ok(Some(published))
    }
}

fn staff_photo_name(staff_id: i64) -> String {
    format!("{:06}.jpg", staff_id)
}

/// 只允许单级文件名
fn sanitize_name(name: &str) -> StorageResult<String> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains('/')
        || trimmed.contains('\\');
    if invalid {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PhotoStore) {
        let root = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(root.path().join("webfiles"), root.path().join("temp"));
        (root, store)
    }

    #[test]
    fn test_stage_writes_both_dirs_and_hashes() {
        let (root, store) = store();
        let staged = store.stage(b"abc", None).unwrap();

        assert_eq!(staged.file_name, STAGED_PHOTO_NAME);
        assert_eq!(
            staged.hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(staged.size, 3);
        assert!(root.path().join("temp/temp.jpg").is_file());
        assert!(root.path().join("webfiles/temp.jpg").is_file());
    }

    #[test]
    fn test_attach_renames_to_staff_id() {
        let (root, store) = store();
        assert_eq!(store.attach_staged(7).unwrap(), None);

        store.stage(b"photo", None).unwrap();
        let published = store.attach_staged(7).unwrap().unwrap();

        assert!(published.ends_with("000007.jpg"));
        assert_eq!(fs::read(&published).unwrap(), b"photo");
        assert!(!root.path().join("temp/temp.jpg").exists());
        assert!(root.path().join("temp/000007.jpg").is_file());
    }

    #[test]
    fn test_rejects_bad_input() {
        let (_root, store) = store();
        assert!(matches!(store.stage(b"", None), Err(StorageError::EmptyContent)));
        assert!(matches!(
            store.stage(b"x", Some("../evil.jpg")),
            Err(StorageError::InvalidName(_))
        ));
    }
}
