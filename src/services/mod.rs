pub mod api_service;
pub mod auth_service;
pub mod crypto;
pub mod junyou_service;
pub mod observer;
