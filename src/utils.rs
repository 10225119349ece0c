/// Bytes per word of the hex memory image.
pub const WORD_BYTES: u64 = 4;

const WORD_MASK: u64 = !(WORD_BYTES - 1);

/// Round down to the containing word.
pub fn floor_align(addr: u64) -> u64 {
    addr & WORD_MASK
}

/// Round up to the next word boundary. Wraps like the fixed-width hardware addresses it models.
pub fn ceil_align(addr: u64) -> u64 {
    addr.wrapping_add(WORD_BYTES - 1) & WORD_MASK
}

/// Parse hex address from string (supports "0x1234" or "1234" format)
pub fn parse_hex_address(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();
    let hex_str = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let hex_str = hex_str.strip_suffix("lu").unwrap_or(hex_str);
    u64::from_str_radix(&hex_str.replace('_', ""), 16)
        .map_err(|e| format!("'{}' is not a hex address: {}", input, e))
}
