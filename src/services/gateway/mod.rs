pub mod executor_registry_service;
pub mod frame_service;
pub mod screening_service;
pub mod session_bridge_service;
