use std::io::{self, Write};

use crate::memory::MemoryImage;
use crate::utils::{ceil_align, floor_align, WORD_BYTES};

/// Write a `$readmemh` image of 32-bit words.
///
/// Covers the words from the one containing `base_addr` through the one
/// containing `top_addr`. Addresses in directives and comments are relative
/// to `base_addr`. When the covered words stop short of the last word of the
/// window (`limit_addr - 4`), that word is written as zero so the reader sees
/// a value for every location.
///
/// Format:
/// ```text
/// @0000000    // raw_mem addr;  byte addr: 00000000
/// 04030201    // raw_mem addr 00000000;  byte addr 00000000
/// ...
/// @0000fff    // last raw_mem addr;  byte addr: 00003ffc
/// 00000000    // raw_mem addr 00000fff;  byte addr 00003ffc
/// ```
pub fn write_mem_hex<W: Write>(
    out: &mut W,
    image: &MemoryImage,
    base_addr: u64,
    top_addr: u64,
    limit_addr: u64,
) -> io::Result<()> {
    let a1 = floor_align(base_addr);
    let a2 = ceil_align(top_addr.wrapping_add(1));

    let offset = a1.wrapping_sub(base_addr);
    writeln!(
        out,
        "@{:07x}    // raw_mem addr;  byte addr: {:08x}",
        offset / WORD_BYTES,
        offset
    )?;

    let mut last_word = None;
    let mut addr = a1;
    while addr < a2 {
        write_word(out, image.read_word(addr), addr, base_addr)?;
        last_word = Some(addr);
        addr += WORD_BYTES;
    }

    if let Some(final_word) = limit_addr.checked_sub(WORD_BYTES) {
        if last_word.map_or(true, |last| last < final_word) {
            let offset = final_word.wrapping_sub(base_addr);
            writeln!(
                out,
                "@{:07x}    // last raw_mem addr;  byte addr: {:08x}",
                offset / WORD_BYTES,
                offset
            )?;
            write_word(out, [0; 4], final_word, base_addr)?;
        }
    }
    Ok(())
}

/// [`write_mem_hex`] into a `String`.
pub fn render_mem_hex(
    image: &MemoryImage,
    base_addr: u64,
    top_addr: u64,
    limit_addr: u64,
) -> String {
    let mut buf = Vec::new();
    // Writes to a Vec cannot fail.
    let _ = write_mem_hex(&mut buf, image, base_addr, top_addr, limit_addr);
    String::from_utf8_lossy(&buf).into_owned()
}

// Most significant byte first: the word at `addr` holds bytes addr..addr+4, little-endian.
fn write_word<W: Write>(out: &mut W, word: [u8; 4], addr: u64, base_addr: u64) -> io::Result<()> {
    let offset = addr.wrapping_sub(base_addr);
    writeln!(
        out,
        "{:02x}{:02x}{:02x}{:02x}    // raw_mem addr {:08x};  byte addr {:08x}",
        word[3],
        word[2],
        word[1],
        word[0],
        offset / WORD_BYTES,
        offset
    )
}
