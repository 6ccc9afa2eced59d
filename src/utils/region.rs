use crate::utils::Result;

/// Region on a named sequence; `start` is 0-based and `end` exclusive, matching
/// the BED convention used for region lists.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomicRegion {
    pub contig: String,
    pub start: u32,
    pub end: u32,
}

impl GenomicRegion {
    pub fn new(contig: impl Into<String>, start: u32, end: u32) -> Result<Self> {
        if start >= end {
            return Err(format!("Invalid region: start {} >= end {}", start, end));
        }

        Ok(Self {
            contig: contig.into(),
            start,
            end,
        })
    }

    /// Parses `chr:start-end` where `start` is 1-based inclusive (samtools style).
    pub fn from_string(encoding: &str) -> Result<Self> {
        let error_msg = || format!("Invalid region encoding: {}", encoding);
        let (contig, range) = encoding.rsplit_once(':').ok_or_else(error_msg)?;
        let (start, end) = range.split_once('-').ok_or_else(error_msg)?;

        let start: u32 = start.replace(',', "").parse().map_err(|_| error_msg())?;
        let end: u32 = end.replace(',', "").parse().map_err(|_| error_msg())?;
        if start == 0 || contig.is_empty() {
            return Err(error_msg());
        }

        Self::new(contig.to_string(), start - 1, end)
    }

    /// Parses the first three columns of a BED line.
    pub fn from_bed_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(format!(
                "Expected at least 3 fields in the format 'chrom start end', found {}: {}",
                fields.len(),
                line
            ));
        }
        let start: u32 = fields[1]
            .parse()
            .map_err(|_| format!("Invalid BED start: {}", line))?;
        let end: u32 = fields[2]
            .parse()
            .map_err(|_| format!("Invalid BED end: {}", line))?;
        Self::new(fields[0], start, end)
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display name used as the pass-through sequence name of scanned regions.
    pub fn name(&self) -> String {
        format!("{}:{}-{}", self.contig, self.start + 1, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::GenomicRegion;

    #[test]
    fn init_region_from_valid_string_ok() {
        let region = GenomicRegion::from_string("chr1:100-200").unwrap();
        assert_eq!(region.contig, "chr1");
        assert_eq!(region.start, 99);
        assert_eq!(region.end, 200);
        assert_eq!(region.name(), "chr1:100-200");
    }

    #[test]
    fn init_region_with_colon_in_contig_ok() {
        let region = GenomicRegion::from_string("HLA-A*01:01:1-1,000").unwrap();
        assert_eq!(region.contig, "HLA-A*01:01");
        assert_eq!(region.end, 1000);
    }

    #[test]
    fn init_region_from_invalid_string_err() {
        assert_eq!(
            GenomicRegion::from_string("chr1:100"),
            Err("Invalid region encoding: chr1:100".to_string())
        );
    }

    #[test]
    fn init_region_from_invalid_start_err() {
        assert_eq!(
            GenomicRegion::from_string("chr1:a-200"),
            Err("Invalid region encoding: chr1:a-200".to_string())
        );
    }

    #[test]
    fn init_region_from_invalid_interval_err() {
        assert_eq!(
            GenomicRegion::from_string("chr1:201-100"),
            Err("Invalid region: start 200 >= end 100".to_string())
        );
    }

    #[test]
    fn init_region_from_bed_line() {
        let region = GenomicRegion::from_bed_line("chrX\t10\t50\tname").unwrap();
        assert_eq!(region, GenomicRegion::new("chrX", 10, 50).unwrap());
        assert_eq!(region.len(), 40);
        assert!(GenomicRegion::from_bed_line("chrX\t10").is_err());
    }
}
