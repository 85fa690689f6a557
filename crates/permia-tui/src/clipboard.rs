// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::io::Write;

use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Payload ceiling most terminals accept for OSC 52 (base64 bytes).
pub const MAX_OSC52_PAYLOAD: usize = 74_994;

/// OSC 52 "set clipboard" sequence for the system clipboard.
pub fn osc52_sequence(content: &str) -> Result<String> {
    let encoded = STANDARD.encode(content.as_bytes());
    if encoded.len() > MAX_OSC52_PAYLOAD {
        bail!(
            "clipboard payload too large ({} > {MAX_OSC52_PAYLOAD} bytes) -- copy a shorter value",
            encoded.len()
        );
    }
    Ok(format!("\x1b]52;c;{encoded}\x07"))
}

/// Asks the terminal to place `content` on the clipboard. The terminal may
/// silently ignore the request; there is no acknowledgement.
pub fn copy_osc52(writer: &mut impl Write, content: &str) -> Result<()> {
    let sequence = osc52_sequence(content)?;
    writer
        .write_all(sequence.as_bytes())
        .context("write clipboard sequence")?;
    writer.flush().context("flush clipboard sequence")
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    use super::{MAX_OSC52_PAYLOAD, copy_osc52, osc52_sequence};

    #[test]
    fn sequence_wraps_base64_payload() -> anyhow::Result<()> {
        let sequence = osc52_sequence("4111 1111 1111 1111")?;
        let expected = format!("\x1b]52;c;{}\x07", STANDARD.encode("4111 1111 1111 1111"));
        assert_eq!(sequence, expected);
        Ok(())
    }

    #[test]
    fn copy_writes_the_sequence() -> anyhow::Result<()> {
        let mut out = Vec::new();
        copy_osc52(&mut out, "P@ssw0rd-01")?;
        assert!(out.starts_with(b"\x1b]52;c;"));
        assert!(out.ends_with(b"\x07"));
        Ok(())
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let huge = "x".repeat(MAX_OSC52_PAYLOAD);
        let error = osc52_sequence(&huge).expect_err("too large").to_string();
        assert!(error.contains("too large"), "{error}");
    }
}
