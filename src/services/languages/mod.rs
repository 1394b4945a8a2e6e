pub mod language_service;
pub mod language_storage_service;
