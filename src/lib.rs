// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! Stowgate - Identity Federation Gateway for Object Storage
//!
//! This crate fronts an S3-compatible object store with OpenID Connect
//! authentication: external identity tokens are verified against the
//! provider's JWKS, federated into temporary storage credentials via STS,
//! and bundled into self-contained internal session tokens.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification, session issuance, authorization
//! - `config` - Environment-driven configuration
//! - `crypto` - Authenticated payload encryption
//! - `sts` - Credential federation against the storage endpoint

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod state;
pub mod sts;
