use super::{open_genome_reader, open_region_list, GenomicRegion, Result};
use crossbeam_channel::Sender;
use rust_htslib::faidx;
use std::{collections::HashMap, path::Path};

/// A sequence to scan: a whole contig or a region of one.
#[derive(Debug)]
pub struct Target {
    pub name: String,
    pub region: GenomicRegion,
    pub seq: Vec<u8>,
}

impl Target {
    pub fn new(
        genome_reader: &faidx::Reader,
        chrom_lookup: &HashMap<String, u32>,
        region: GenomicRegion,
        name: String,
    ) -> Result<Self> {
        check_region_bounds(&region, chrom_lookup)?;
        let seq = genome_reader
            .fetch_seq_string(&region.contig, region.start as usize, region.end as usize - 1)
            .map_err(|e| {
                format!(
                    "Error fetching sequence for region {}: {}",
                    region.name(),
                    e
                )
            })?;
        Ok(Target {
            name,
            region,
            seq: sanitize(seq.as_bytes()),
        })
    }
}

/// Upper-cases the sequence and masks anything outside `ACGT` as `N`.
pub fn sanitize(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|b| match b.to_ascii_uppercase() {
            base @ (b'A' | b'C' | b'G' | b'T') => base,
            _ => b'N',
        })
        .collect()
}

pub fn create_chrom_lookup(reader: &faidx::Reader) -> Result<HashMap<String, u32>> {
    let num_seqs = reader.n_seqs() as usize;
    let mut map = HashMap::with_capacity(num_seqs);
    for i in 0..num_seqs {
        let name = reader.seq_name(i as i32).map_err(|e| e.to_string())?;
        let len = reader.fetch_seq_len(&name);
        let len_u32 = u32::try_from(len).map_err(|_| {
            format!(
                "Sequence length for '{}' cannot be converted to u32",
                &name
            )
        })?;
        map.insert(name, len_u32);
    }
    Ok(map)
}

/// Regions to scan: the given region, the regions of a BED file, or every
/// contig of the reference in index order.
pub fn resolve_regions(
    genome_reader: &faidx::Reader,
    region: Option<&GenomicRegion>,
    regions_path: Option<&Path>,
) -> Result<Vec<(GenomicRegion, String)>> {
    if let Some(region) = region {
        return Ok(vec![(region.clone(), region.name())]);
    }
    if let Some(path) = regions_path {
        return Ok(open_region_list(path)?
            .into_iter()
            .map(|region| {
                let name = region.name();
                (region, name)
            })
            .collect());
    }
    let mut regions = Vec::new();
    for i in 0..genome_reader.n_seqs() as usize {
        let name = genome_reader.seq_name(i as i32).map_err(|e| e.to_string())?;
        let len = u32::try_from(genome_reader.fetch_seq_len(&name))
            .map_err(|_| format!("Sequence length for '{}' cannot be converted to u32", &name))?;
        if len == 0 {
            log::warn!("Skipping empty contig '{}'", name);
            continue;
        }
        regions.push((GenomicRegion::new(name.clone(), 0, len)?, name));
    }
    Ok(regions)
}

pub fn stream_targets_into_channel(
    genome_path: &Path,
    region: Option<GenomicRegion>,
    regions_path: Option<&Path>,
    sender: Sender<Result<Target>>,
) -> Result<()> {
    let genome_reader = open_genome_reader(genome_path)?;
    let chrom_lookup = create_chrom_lookup(&genome_reader)?;
    let regions = resolve_regions(&genome_reader, region.as_ref(), regions_path)?;
    log::debug!("Streaming {} target sequences", regions.len());

    for (region, name) in regions {
        let target = Target::new(&genome_reader, &chrom_lookup, region, name);
        if sender.send(target).is_err() {
            return Err("Target receiver disconnected".into());
        }
    }
    Ok(())
}

fn check_region_bounds(region: &GenomicRegion, chrom_lookup: &HashMap<String, u32>) -> Result<()> {
    let chrom_length = *chrom_lookup.get(&region.contig).ok_or_else(|| {
        format!(
            "FASTA reference does not contain chromosome '{}'",
            &region.contig
        )
    })?;
    if region.end > chrom_length {
        return Err(format!(
            "Region end '{}' exceeds chromosome '{}' bounds (0..{}).",
            region.end, &region.contig, chrom_length
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_masks_ambiguity_codes() {
        assert_eq!(sanitize(b"acgtRYNn"), b"ACGTNNNN".to_vec());
    }

    #[test]
    fn region_bounds_are_checked() {
        let lookup: HashMap<String, u32> = [("chr1".to_string(), 100)].into_iter().collect();
        assert!(check_region_bounds(&GenomicRegion::new("chr1", 0, 100).unwrap(), &lookup).is_ok());
        assert!(check_region_bounds(&GenomicRegion::new("chr1", 50, 101).unwrap(), &lookup).is_err());
        assert!(check_region_bounds(&GenomicRegion::new("chr2", 0, 10).unwrap(), &lookup).is_err());
    }
}
