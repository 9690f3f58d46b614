pub mod config;
pub mod locate;
pub mod profile;
pub mod record;
