mod io_utils;
mod readers;
mod region;
pub mod seq;
mod target;
mod util;
mod writers;

pub use io_utils::{close_output, create_writer, open_output, OutputSink, OutputWriter};
pub use readers::{open_genome_reader, open_region_list};
pub use region::GenomicRegion;
pub use target::{create_chrom_lookup, resolve_regions, sanitize, stream_targets_into_channel, Target};
pub use util::{format_number_with_commas, handle_error_and_exit, Result};
pub use writers::RecordWriter;
