pub mod poller;
pub mod snapshot;
