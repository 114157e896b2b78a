//! API Module
//!
//! HTTP handlers and routing over any cache backend.
//!
//! # Endpoints
//! - `PUT /set`, `GET /get/:key` - Store and read values
//! - `DELETE /del/:key`, `DELETE /unlink/:key` - Delete with relevant keys
//! - `GET /relevant/:key` - Preview a delete
//! - `POST /incr/:key`, `POST /mget` - Counters and bulk reads
//! - `PUT /hset`, `GET /hget/:key/:field`, `GET /hlen/:key` - Hash fields
//! - `GET /dump`, `DELETE /purge` - Diagnostics and reset
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
