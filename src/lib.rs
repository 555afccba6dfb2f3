//! # aspfile
//!
//! *.asp files store per-position pileup data (the bases, qualities, cycles,
//! strands and mapping qualities observed at each reference position) in a
//! compact binary stream.
//!
//! A file is a chromosome [`AspHeader`] followed by a flat stream of records.
//! Records do not carry their own position: position records anchor the
//! stream at a chromosome and position, and every record after them advances
//! an implicit cursor by one. Short uncovered stretches are bridged with
//! one-byte empty records; longer ones get a new anchor.
//!
//! There are two kinds of data records:
//! - [`DetailedRecord`]s keep every base of the pileup
//! - [`RefOnlyRecord`]s keep only the number of bases and two genotype likelihoods
//!
//! Both are built from a [`Pileup`].
//!
//! ## Usage
//!
//! ### Writing
//!
//! ```rust
//! use aspfile::{AspHeader, AspWriterBuilder, Pileup};
//!
//! let header = AspHeader::from_reference_contigs(["chr1", "chr2"]);
//! let mut writer = AspWriterBuilder::default()
//!     .header(header)
//!     .build(Vec::new())
//!     .unwrap();
//!
//! let mut pileup = Pileup::new(b'G');
//! pileup.add(b'G', b'I', 12, false, 60);
//! pileup.add(b'A', b'5', 40, true, 60);
//!
//! // Positions are 0-based and increasing within a chromosome
//! writer.write(&pileup.to_detailed_record(), "chr1", 1000).unwrap();
//! writer.write(&pileup.to_ref_only_record(), "chr1", 1002).unwrap();
//! writer.flush().unwrap();
//! ```
//!
//! ### Reading
//!
//! ```rust
//! use aspfile::{AspHeader, AspReader, AspWriterBuilder, Pileup};
//!
//! # let mut writer = AspWriterBuilder::default()
//! #     .header(AspHeader::from_reference_contigs(["chr1"]))
//! #     .build(Vec::new())
//! #     .unwrap();
//! # let mut pileup = Pileup::new(b'G');
//! # pileup.add(b'A', b'5', 40, true, 60);
//! # writer.write(&pileup.to_ref_only_record(), "chr1", 1002).unwrap();
//! # let bytes = writer.into_inner();
//! let mut reader = AspReader::new(bytes.as_slice()).unwrap();
//!
//! // Iterate over all data records
//! while let Some(record) = reader.next_data_record().unwrap() {
//!     let (chrom_id, pos) = (record.chrom_id(), record.pos());
//!     let num_bases = record.record.num_bases();
//!     let chrom = reader.chrom_name(chrom_id).unwrap();
//!     println!("{chrom}:{pos} has {num_bases} bases");
//! }
//! ```
//!
//! Point queries move forward through the stream with
//! [`AspReader::advance_to_position`] and the helpers built on it.

mod error;
mod header;
mod policy;
mod reader;
mod record;
mod utils;
mod writer;

pub mod prelude;

pub use error::{Error, HeaderError, ReadError, Result, WriteError};
pub use header::AspHeader;
pub use policy::NPolicy;
pub use reader::{AspReader, Lookup};
pub use record::{
    AspRecord, DetailedRecord, LocatedRecord, Locus, Pileup, PileupBase, RecordCounts, RecordKind,
    RefOnlyRecord,
};
pub use utils::{DELETION_BASE, MAX_NUM_BASES};
pub use writer::{AspWriter, AspWriterBuilder};

/// Default largest gap between two positions bridged with empty records
pub const DEFAULT_GAP_SIZE: u32 = 100;
