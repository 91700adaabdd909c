pub mod auth;
pub mod consultations;
pub mod estimates;
pub mod products;
pub mod sanitize;
