// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod server;
pub mod vin;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{HealthResponse, IndexResponse, ModelInfoResponse};
pub use server::{create_app, start_server, AppState};
pub use vin::{ExtractResponse, VerifyRequest, VerifyResponse};
