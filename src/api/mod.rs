pub mod gateway_controller;
pub mod middleware;
