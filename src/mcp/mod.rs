// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Model Context Protocol over HTTP + SSE.

pub mod protocol;
pub mod server;
pub mod session;

pub use protocol::{JsonRpcRequest, JsonRpcResponse};
pub use server::McpServer;
pub use session::SessionStore;
