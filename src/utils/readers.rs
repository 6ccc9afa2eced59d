use super::{GenomicRegion, Result};
use flate2::read::MultiGzDecoder;
use rust_htslib::faidx;
use std::fs::File;
use std::io::{BufRead, BufReader, Read as ioRead};
use std::path::Path;

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".gzip")
}

fn open_text_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(format!("Invalid gzip header: {}", path.to_string_lossy()))
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

/// Reads a (optionally gzipped) BED file of regions to scan, skipping blank,
/// comment, `track` and `browser` lines.
pub fn open_region_list(path: &Path) -> Result<Vec<GenomicRegion>> {
    let reader = open_text_reader(path)?;
    let mut regions = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("Error reading BED line {}: {}", line_number + 1, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with("track")
            || trimmed.starts_with("browser")
        {
            continue;
        }
        let region = GenomicRegion::from_bed_line(trimmed)
            .map_err(|e| format!("BED line {}: {}", line_number + 1, e))?;
        regions.push(region);
    }
    Ok(regions)
}

pub fn open_genome_reader(path: &Path) -> Result<faidx::Reader> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| format!("Reference path has no extension: {}", path.display()))?;
    let fai_path = path.with_extension(extension.to_owned() + ".fai");
    if !fai_path.exists() {
        return Err(format!(
            "Reference index file not found: {}. Create it using 'samtools faidx {}'",
            fai_path.display(),
            path.display()
        ));
    }
    faidx::Reader::from_path(path).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn region_list_skips_headers_and_comments() {
        let mut file = tempfile::Builder::new().suffix(".bed").tempfile().unwrap();
        writeln!(file, "track name=test").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "chr1\t0\t100").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "chr2\t50\t75\tid").unwrap();
        let regions = open_region_list(file.path()).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1], GenomicRegion::new("chr2", 50, 75).unwrap());
    }

    #[test]
    fn region_list_reports_bad_line() {
        let mut file = tempfile::Builder::new().suffix(".bed").tempfile().unwrap();
        writeln!(file, "chr1\t100\t10").unwrap();
        let err = open_region_list(file.path()).unwrap_err();
        assert!(err.starts_with("BED line 1"));
    }

    #[test]
    fn gzipped_region_list_is_decoded() {
        let file = tempfile::Builder::new().suffix(".bed.gz").tempfile().unwrap();
        {
            let mut encoder =
                flate2::write::GzEncoder::new(file.reopen().unwrap(), flate2::Compression::fast());
            writeln!(encoder, "chr3\t1\t9").unwrap();
            encoder.finish().unwrap();
        }
        let regions = open_region_list(file.path()).unwrap();
        assert_eq!(regions, vec![GenomicRegion::new("chr3", 1, 9).unwrap()]);
    }
}
