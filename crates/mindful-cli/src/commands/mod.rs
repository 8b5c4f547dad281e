pub mod browse;
pub mod helpers;
pub mod init;
pub mod settings;
pub mod status;
