pub mod gateway;
pub mod http;
pub mod languages;
pub mod middleware;
