// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Read;
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;
use std::path::Path;

use crate::error::WarmError;
use crate::protocol::InvocationPayload;

/// Connect to `path`, hand over our argv/env/cwd and our own stdio, and
/// block for the 4-byte exit code (§6 wire protocol #1). Returns a
/// connect-kind error when nothing is listening, which the caller treats as
/// "take the cold path" rather than a real failure.
pub fn try_client_invoke(path: &Path) -> Result<i32, WarmError> {
    let sock = UnixStream::connect(path).map_err(|source| WarmError::Connect { path: path.to_path_buf(), source })?;

    let payload = InvocationPayload::capture().map_err(|source| WarmError::Connect { path: path.to_path_buf(), source })?;
    let data = serde_json::to_vec(&payload)?;

    crate::fd_passing::send_fds(sock.as_raw_fd(), &[0, 1, 2], &data)
        .map_err(|source| WarmError::FdPassing { path: path.to_path_buf(), source })?;

    let mut code_buf = [0u8; 4];
    let mut reader = &sock;
    reader.read_exact(&mut code_buf).map_err(|_| WarmError::Truncated)?;
    Ok(i32::from_be_bytes(code_buf))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
