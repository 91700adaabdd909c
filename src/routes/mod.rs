pub mod auth;
pub mod consultations;
pub mod estimates;
pub mod health;
pub mod products;
