pub mod analyze;
pub mod init;
pub mod serve;
pub mod validate;
