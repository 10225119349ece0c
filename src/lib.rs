// Crate root: declare modules and control visibility
pub mod config;
pub mod convert;
pub mod debug;
pub mod elf_items;
pub mod error;
pub mod hex_writer;
pub mod loader;
pub mod memory;
pub mod symbols;
// ELF fixture writer for tests, not part of the supported API
#[doc(hidden)]
pub mod testing;
pub mod utils;

// Re-export commonly used API from the library for binaries/tests
pub use error::{ConvertError, ErrorKind};
pub use hex_writer::{render_mem_hex, write_mem_hex};
pub use loader::{load_elf, load_elf_file, LoadResult, LoaderOptions};
