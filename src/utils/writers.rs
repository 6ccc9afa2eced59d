use super::{close_output, create_writer, open_output, target::Target, OutputWriter, Result};
use crate::motif::RECORD_HEADER;
use crate::workflows::{summarize, ScanOutput, SUMMARY_HEADER};
use std::io::Write;

/// Motif records (`{prefix}.motifs.tsv.gz`) and per-class summaries
/// (`{prefix}.summary.tsv`) of every scanned target.
pub struct RecordWriter {
    motifs: OutputWriter,
    summary: OutputWriter,
}

impl RecordWriter {
    pub fn new(output_prefix: &str) -> Result<Self> {
        let mut motifs = create_writer(output_prefix, "motifs.tsv.gz", open_output)?;
        let mut summary = create_writer(output_prefix, "summary.tsv", open_output)?;
        writeln!(motifs, "{}", RECORD_HEADER).map_err(|e| e.to_string())?;
        writeln!(summary, "{}", SUMMARY_HEADER).map_err(|e| e.to_string())?;
        Ok(RecordWriter { motifs, summary })
    }

    pub fn write(&mut self, target: &Target, output: &ScanOutput) -> Result<()> {
        for record in output.records(&target.name, &target.seq) {
            writeln!(self.motifs, "{}", record.to_tsv()).map_err(|e| e.to_string())?;
        }
        for class in summarize(&output.motifs, target.seq.len()) {
            writeln!(self.summary, "{}", class.to_tsv(&target.name)).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        close_output(self.motifs)?;
        close_output(self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::GenomicRegion;
    use crate::workflows::{Config, Scanner};
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn writes_records_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("sample");
        let prefix = prefix.to_str().unwrap();

        let seq = b"NNNNNCACACACACACACANNNNN".to_vec();
        let target = Target {
            name: "chr1:1-24".to_string(),
            region: GenomicRegion::new("chr1", 0, 24).unwrap(),
            seq,
        };
        let scanner = Scanner::new(Config {
            max_workers: Some(1),
            ..Config::default()
        })
        .unwrap();
        let output = scanner.scan(&target.seq).unwrap();

        let mut writer = RecordWriter::new(prefix).unwrap();
        writer.write(&target, &output).unwrap();
        writer.finish().unwrap();

        let mut text = String::new();
        GzDecoder::new(std::fs::File::open(format!("{}.motifs.tsv.gz", prefix)).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], RECORD_HEADER);
        assert!(lines[1..].iter().any(|line| line.contains("\tSTR\t6\t19\t14\t")));

        let summary = std::fs::read_to_string(format!("{}.summary.tsv", prefix)).unwrap();
        assert!(summary.starts_with(SUMMARY_HEADER));
        assert!(summary.contains("chr1:1-24\tSlipped_DNA\t"));
    }
}
