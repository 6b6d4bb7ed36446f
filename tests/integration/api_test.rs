//! API endpoint integration tests
//!
//! Drives the composed application over the in-memory store: webhook ingress and the read API.

#![allow(dead_code)]

mod common;
mod conversations;
mod webhook;
