//! Employee records feature: thin typed wrappers over the CRUD and upload
//! endpoints. No flow logic lives here; access control is the auth
//! feature's job.

pub mod client;
pub mod types;
