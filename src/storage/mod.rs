//!  Storage is organized through [kv_store::KeyValueStore].
//!  The basic idea is:
//!   - There are three keys: configuration, runtime state and the attendance log.
//!   - Each key holds one JSON blob, a file per key for [kv_store::FileStore].
//!   - Missing or malformed blobs are replaced by defaults, never reported as errors.

pub mod attendance;
pub mod entities;
pub mod kv_store;
