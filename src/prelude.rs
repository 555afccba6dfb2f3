pub use super::{
    AspHeader, AspReader, AspRecord, AspWriter, AspWriterBuilder, Lookup, Pileup, RecordKind,
};

pub use crate::record::{DetailedRecord, LocatedRecord, Locus, RefOnlyRecord};
