pub mod client;
pub mod poller;
