//! File-based storage backend.
//!
//! Stores each key as a file under a base directory, giving the session
//! store durability across process restarts without any external service.
//! Keys are sanitized into filesystem-safe names before use.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use bluecust_types::ImplementationRegistry;
use std::path::PathBuf;
use tokio::fs;

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance rooted at the given directory.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	///
	/// Replaces path-hostile characters and appends a .json extension since
	/// the service layer always writes JSON payloads.
	fn file_path(&self, key: &str) -> PathBuf {
		let safe: String = key
			.chars()
			.map(|c| match c {
				'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
				_ => '_',
			})
			.collect();
		self.base_path.join(format!("{}.json", safe))
	}

	async fn ensure_base_dir(&self) -> Result<(), StorageError> {
		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(format!("Cannot create storage dir: {}", e)))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key);
		match fs::read(&path).await {
			Ok(bytes) => Ok(bytes),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(format!(
				"Cannot read {}: {}",
				path.display(),
				e
			))),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		self.ensure_base_dir().await?;
		let path = self.file_path(key);
		// Write via a temp file so a crash mid-write cannot corrupt the record
		let tmp = path.with_extension("json.tmp");
		fs::write(&tmp, &value)
			.await
			.map_err(|e| StorageError::Backend(format!("Cannot write {}: {}", tmp.display(), e)))?;
		fs::rename(&tmp, &path)
			.await
			.map_err(|e| StorageError::Backend(format!("Cannot commit {}: {}", path.display(), e)))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.file_path(key);
		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(format!(
				"Cannot delete {}: {}",
				path.display(),
				e
			))),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.file_path(key);
		match fs::metadata(&path).await {
			Ok(_) => Ok(true),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
			Err(e) => Err(StorageError::Backend(format!(
				"Cannot stat {}: {}",
				path.display(),
				e
			))),
		}
	}
}

/// Registry for the file storage backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path` (required): directory the session files live under.
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| {
			StorageError::Configuration("file storage requires 'storage_path'".into())
		})?;
	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_round_trip_survives_reopen() {
		let dir = tempfile::tempdir().unwrap();
		let key = "session:current";

		{
			let storage = FileStorage::new(dir.path().to_path_buf());
			storage.set_bytes(key, b"persisted".to_vec()).await.unwrap();
		}

		// A fresh instance over the same directory sees the value
		let storage = FileStorage::new(dir.path().to_path_buf());
		assert_eq!(storage.get_bytes(key).await.unwrap(), b"persisted".to_vec());

		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());
	}

	#[tokio::test]
	async fn test_missing_key_is_not_found() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());
		assert!(matches!(
			storage.get_bytes("absent").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_factory_requires_storage_path() {
		let config: toml::Value = toml::from_str("").unwrap();
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));
	}
}
