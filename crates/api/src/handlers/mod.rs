pub mod activities;
pub mod auth;
