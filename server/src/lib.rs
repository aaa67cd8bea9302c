// Life of a request:
// 1. HTTP request comes in
// 2. The api layer checks the body against the route's required fields
// 3. The matching flow runs:
//     - signup: hash password, atomic insert, issue token
//     - signin: look up user, verify password, issue token
//     - me: verify token, re-read user, return public profile
// 4. The api layer maps the flow's result to a status code and body
//
// System components:
//  - User store (memory or append-only log)
//  - Credential hasher (Argon2id)
//  - Token service (HS256 JWT)

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod auth;
pub mod config;
pub mod flows;
pub mod storage;

#[cfg(test)]
mod testing;
