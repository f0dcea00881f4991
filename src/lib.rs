//! annostore - Web Annotation store search services
//!
//! - `query` - compiles client query expressions into match pipelines
//! - `search` - session-cached searches with paginated results
//! - `index` - annotation field indexes over the store's native catalog
//! - `store` - the document store collaborator and its in-memory backend
//! - `http_server` - the REST surface
//! - `cli` - command-line entry points

pub mod cli;
pub mod config;
pub mod http_server;
pub mod index;
pub mod query;
pub mod search;
pub mod store;
pub mod uri;
