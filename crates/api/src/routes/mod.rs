pub mod converter;
pub mod health;
