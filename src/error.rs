/// Custom Result type for ASP operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the aspfile library, encompassing all possible error cases
/// that can occur while reading or writing ASP files.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors related to the chromosome header section
    HeaderError(#[from] HeaderError),
    /// Errors that occur while decoding records
    ReadError(#[from] ReadError),
    /// Errors that occur during write operations
    WriteError(#[from] WriteError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}
impl Error {
    /// Checks if the error means the record stream is damaged past recovery
    ///
    /// The format carries no resynchronization marker beyond position records,
    /// so a corrupt or unknown record aborts the current scan.
    #[must_use]
    pub fn is_corrupt_stream(&self) -> bool {
        matches!(
            self,
            Self::ReadError(ReadError::CorruptStream { .. } | ReadError::InvalidRecordType(_))
        )
    }
}

/// Errors specific to reading and writing the chromosome header
#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    /// The header ended before all of its fields could be read
    ///
    /// # Arguments
    /// * `&'static str` - The field that was being read
    /// * `std::io::Error` - The underlying short-read error
    #[error("Header truncated while reading {0}: {1}")]
    Truncated(&'static str, #[source] std::io::Error),

    /// The number of chromosomes stored in the header is negative
    #[error("Invalid number of chromosomes in header: {0}")]
    InvalidChromosomeCount(i32),

    /// A chromosome name length is not positive
    ///
    /// # Fields
    /// * `index` - The chromosome id whose name was being read
    /// * `len` - The length found (including the terminating nul)
    #[error("Invalid name length ({len}) for chromosome {index}")]
    InvalidNameLength { index: usize, len: i32 },

    /// A chromosome name is not valid UTF-8
    #[error("Chromosome {0} has a name that is not valid UTF-8")]
    InvalidName(usize, #[source] std::str::Utf8Error),

    /// The header has more chromosomes than an `i32` can describe
    #[error("Too many chromosomes to fit in a header: {0}")]
    TooManyChromosomes(usize),

    /// A chromosome name is too long for its `i32` length field
    #[error("Chromosome name too long to fit in a header: {0} bytes")]
    NameTooLong(usize),
}

/// Errors that can occur while decoding the record stream
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// The stream ended in the middle of a record
    ///
    /// # Fields
    /// * `field` - The record field that could not be read in full
    /// * `source` - The underlying short-read error
    #[error("Record stream truncated while reading {field}")]
    CorruptStream {
        field: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The low nibble of a type byte does not name a known record type
    ///
    /// # Arguments
    /// * `u8` - The full type byte that was found
    #[error("Invalid record type byte: {0:#04x}")]
    InvalidRecordType(u8),
}

/// Errors that can occur while writing records
#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    /// The chromosome is not present in the writer's header
    #[error("Chromosome not found in header: {0}")]
    UnknownChromosome(String),

    /// Records must be written in strictly increasing position order on a chromosome
    ///
    /// # Fields
    /// * `chrom` - The chromosome being written
    /// * `last` - The last position written on that chromosome
    /// * `pos` - The rejected position
    #[error("Out of order write on {chrom}: position {pos} is not after {last}")]
    OutOfOrder { chrom: String, last: i32, pos: i32 },

    /// Positions are 0-based and cannot be negative
    #[error("Invalid 0-based position: {0}")]
    InvalidPosition(i32),

    /// Position records are generated by the writer and cannot be written directly
    #[error("Position records cannot be written directly")]
    UnexpectedRecordKind,

    /// Attempted to build a writer without first setting up the header
    #[error("Missing header in writer builder")]
    MissingHeader,
}
