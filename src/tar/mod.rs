//! TAR builder and parser.
//!
//! Headers follow the ustar layout with GNU magic; content is padded to
//! 512-byte blocks and the archive ends with two zero blocks.

pub mod builder;
pub mod entry;
pub mod header;
pub mod parser;

pub use builder::{TarBuilder, TarBuilderOptions};
pub use entry::{TarDirectoryEntry, TarFileEntry};
pub use header::{compute_unsigned_checksum, parse_null_padded_string, TarHeader, TypeFlag, BLOCK_SIZE};
pub use parser::{entries_from_tar, ParsedEntry, TarParser};
