pub mod build;
pub mod catalogues;
pub mod dev;
pub mod init;
pub mod render;
pub mod serve;
