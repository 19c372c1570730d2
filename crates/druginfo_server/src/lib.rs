//! Thin HTTP plumbing around the retrieval engine. No retrieval logic lives
//! here; the handlers translate JSON payloads into `druginfo_rag::method`
//! calls and map errors to status codes.

pub mod controller;
