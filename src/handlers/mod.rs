pub mod auth;
pub mod health;
pub mod predict;
pub mod students;
pub mod train;
pub mod upload;
