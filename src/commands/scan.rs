use crate::cli::ScanArgs;
use crate::composite::HotspotParams;
use crate::resolve::OverlapPolicy;
use crate::utils::{
    format_number_with_commas, stream_targets_into_channel, RecordWriter, Result, Target,
};
use crate::workflows::{Config, ScanOutput, Scanner};
use crossbeam_channel::bounded;
use std::{thread, time::Duration};

const CHANNEL_BUFFER_SIZE: usize = 16;

pub fn config_from_args(args: &ScanArgs) -> Result<Config> {
    let mut config = Config {
        nonoverlap: args.nonoverlap,
        report_hotspots: args.report_hotspots,
        report_hybrids: !args.no_hybrids,
        max_workers: args.num_threads,
        merge_distance: args.merge_distance,
        overlap: OverlapPolicy {
            overlap_budget: args.overlap_budget,
            ..OverlapPolicy::default()
        },
        hotspot: HotspotParams {
            window: args.hotspot_window,
            ..HotspotParams::default()
        },
        chunk_size: args.chunk_size,
        chunk_overlap: args.chunk_overlap,
        detector_timeout: args
            .detector_timeout
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| format!("Invalid detector timeout {}: {}", secs, e))
            })
            .transpose()?,
        backend: args.backend.into(),
        ..Config::default()
    };
    for &(class, score) in &args.min_scores {
        config.set_min_score(class, score);
    }
    for &(class, length) in &args.min_lengths {
        config.set_min_length(class, length);
    }
    config.validate()?;
    Ok(config)
}

pub fn scan(args: ScanArgs) -> Result<()> {
    let config = config_from_args(&args)?;
    let scanner = Scanner::new(config)?;
    log::debug!("Detectors: {}", scanner.detector_names().join(", "));

    let writer = RecordWriter::new(&args.output_prefix)?;

    let (sender_target, receiver_target) = bounded(CHANNEL_BUFFER_SIZE);
    let genome_path = args.genome_path.clone();
    let region = args.region.clone();
    let regions_path = args.regions_path.clone();
    let target_stream_thread = thread::spawn(move || {
        stream_targets_into_channel(&genome_path, region, regions_path.as_deref(), sender_target)
    });

    let (sender_result, receiver_result) = bounded::<(Target, ScanOutput)>(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || -> Result<()> {
        let mut writer = writer;
        for (target, output) in &receiver_result {
            writer.write(&target, &output)?;
        }
        writer.finish()
    });

    let mut scanned = 0;
    for target_result in receiver_target {
        let target = match target_result {
            Ok(target) => target,
            Err(err) => {
                log::error!("Target loading: {}", err);
                continue;
            }
        };
        log::info!(
            "Scanning {} ({} bp)",
            target.name,
            format_number_with_commas(target.seq.len())
        );
        match scanner.scan(&target.seq) {
            Ok(output) => {
                log::info!(
                    "{}: {} motifs, {} composite regions",
                    target.name,
                    output.motifs.len(),
                    output.composites.len()
                );
                scanned += 1;
                if let Err(e) = sender_result.send((target, output)) {
                    log::error!("Failed to send scan result to writer thread: {}", e);
                }
            }
            Err(err) => {
                log::error!("Error scanning {}: {}", target.name, err);
            }
        }
    }

    // Clean-up
    drop(sender_result);
    writer_thread
        .join()
        .expect("Writer thread panicked")?;
    log::trace!("Writer thread finished");
    match target_stream_thread
        .join()
        .expect("Target stream thread panicked")
    {
        Ok(_) => log::trace!("Target stream thread finished"),
        Err(e) => return Err(format!("Target streaming failed: {}", e)),
    }
    log::info!("Scanned {} target sequences", scanned);

    Ok(())
}
