pub mod cache;
pub mod config;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod smtp;
pub mod validation;
pub mod verifier;
