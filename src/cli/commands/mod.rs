pub mod doctor;
pub mod init;
pub mod play;
pub mod record;
pub mod serve;
pub mod stop;
pub mod usage;
