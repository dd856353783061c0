pub mod db;
pub mod listing;
pub mod models;
pub mod repos;
