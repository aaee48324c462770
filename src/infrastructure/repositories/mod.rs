pub mod firestore_item_repository;
pub mod gcs_storage_repository;
pub mod google_tts_repository;
pub mod item_repository;
pub mod storage_repository;
pub mod tts_repository;

pub use firestore_item_repository::FirestoreItemRepository;
pub use gcs_storage_repository::GcsStorageRepository;
pub use google_tts_repository::GoogleTtsRepository;
pub use item_repository::ItemRepository;
pub use storage_repository::{
    content_type_for_path, ObjectMetadata, ObjectStorageRepository, StoredObject,
    ONE_YEAR_CACHE_CONTROL,
};
pub use tts_repository::TtsRepository;

#[cfg(test)]
pub use item_repository::MockItemRepository;
#[cfg(test)]
pub use storage_repository::MockObjectStorageRepository;
#[cfg(test)]
pub use tts_repository::MockTtsRepository;
