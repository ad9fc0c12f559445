// ==========================================
// 吊索具智能柜管理系统 - 文件存储
// ==========================================

pub mod photo_store;

pub use photo_store::{PhotoStore, StagedPhoto, StorageError, StorageResult};
