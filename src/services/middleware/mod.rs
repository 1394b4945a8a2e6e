pub mod rate_limit_service;
