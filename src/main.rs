//! XMP Carver - dump JPEG segments and extract XMP-described images.
//!
//! This binary decodes each input file, prints its structure and writes the
//! embedded images next to it (or into `--output-dir`).

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xmp_carver::{
    config::{Config, ReportFormat},
    report::{ExtractionReport, FileReport},
    AssetExtractor, BlockCache, ByteSource, Error, ExtractionOutcome, FileReader, IoError,
    JpegFile,
};

fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut failures = 0usize;
    for input in &config.inputs {
        if let Err(e) = process_file(&config, input) {
            error!(file = %input.display(), "{}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        warn!(
            failed = failures,
            total = config.inputs.len(),
            "Some inputs could not be processed"
        );
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// =============================================================================
// Per-file Processing
// =============================================================================

fn process_file(config: &Config, input: &Path) -> Result<(), Error> {
    let reader = FileReader::open(input)?;
    let cached = BlockCache::with_capacity(reader, config.block_size, config.cache_blocks);
    let jpeg = JpegFile::decode(ByteSource::new(cached))?;
    debug!(
        file = %input.display(),
        segments = jpeg.segments().len(),
        "Decoded file"
    );

    if config.dump_xmp && !jpeg.xmp().is_empty() {
        let path = config.output_path(input, "xmp");
        write_output(&path, jpeg.xmp().stream())?;
        info!(path = %path.display(), "Wrote XMP stream");
    }

    let mut report = FileReport::new(input.display().to_string(), &jpeg);

    if config.format == ReportFormat::Text {
        println!("{}:", input.display());
        print!("{}", jpeg);
    }

    if config.no_extract {
        print_json(config, &report);
        return Ok(());
    }

    let result = AssetExtractor::new(&jpeg).extract();
    let mut extraction = ExtractionReport::from(&result);

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            report.extraction = Some(extraction);
            print_json(config, &report);
            return Err(e.into());
        }
    };

    if let ExtractionOutcome::Legacy(legacy) = &outcome {
        let metadata = &legacy.metadata;
        if config.format == ReportFormat::Text {
            println!(
                "depth format={}, near={}, far={}",
                metadata.format, metadata.near, metadata.far
            );
        }
    }

    for (asset, asset_report) in outcome.assets().iter().zip(extraction.assets.iter_mut()) {
        let path = config.output_path(input, asset.file_suffix());
        write_output(&path, &asset.data)?;
        info!(
            kind = ?asset.kind,
            bytes = asset.data.len(),
            path = %path.display(),
            "Wrote asset"
        );
        if config.format == ReportFormat::Text {
            println!("wrote {}", path.display());
        }
        asset_report.path = Some(path.display().to_string());
    }

    report.extraction = Some(extraction);
    print_json(config, &report);
    Ok(())
}

fn write_output(path: &Path, data: &[u8]) -> Result<(), IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IoError::File {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;
    }
    fs::write(path, data).map_err(|e| IoError::File {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn print_json(config: &Config, report: &FileReport) {
    if config.format != ReportFormat::Json {
        return;
    }
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize report: {}", e),
    }
}

// =============================================================================
// Logging
// =============================================================================

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "xmp_carver=debug"
    } else {
        "xmp_carver=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
