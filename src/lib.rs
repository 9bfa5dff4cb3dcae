#![doc = "The `todoforge` library crate."]
#![doc = ""]
#![doc = "Domain models, the todo query engine, storage backends, authentication, routing"]
#![doc = "and error handling for the TodoForge service. The binary (`main.rs`) wires these"]
#![doc = "together with a Postgres store; the integration tests use the in-memory store."]

pub mod auth;
pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod store;
