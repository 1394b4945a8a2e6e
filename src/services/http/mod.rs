pub mod language_handler_service;
pub mod router_service;
pub mod ws_handler_service;
