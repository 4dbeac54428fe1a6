//! CLI entry point for the weather grader tool.
//!
//! Provides subcommands for collecting weather samples into a partitioned
//! dataset, summarizing dataset quality, grading a student project, and
//! listing the location catalog.

mod infra;

use crate::infra::github::GithubClient;
use crate::infra::openweather::OpenWeatherClient;
use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use clap::{Parser, Subcommand};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weather_grader::config::{GradingConfig, LocationConfig, SummaryConfig, local_offset};
use weather_grader::grading::GRADING_KEY;
use weather_grader::grading::rubric::final_grading;
use weather_grader::output::{append_record, write_json_file};
use weather_grader::record::WeatherRecord;
use weather_grader::s3::{read_json_from_s3, write_json_to_s3};
use weather_grader::services::repo_host::RepoHost;
use weather_grader::services::weather_api::{Location, WeatherApi};
use weather_grader::summary::report::{SUMMARY_KEY, generate_summary_report};
use weather_grader::summary::types::DatasetSummary;

#[derive(Parser)]
#[command(name = "weather_grader")]
#[command(about = "A tool to collect weather data and grade dataset quality", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect weather samples for every configured location
    Collect {
        /// Directory holding the partitioned dataset
        #[arg(short, long, default_value = "data/weather")]
        data_dir: String,

        /// Optional JSON file with the location catalog
        #[arg(short, long)]
        locations: Option<String>,

        /// Maximum number of concurrent API calls
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,

        /// Sample rate: query every location every X seconds
        #[arg(short = 'r', long, default_value_t = 300)]
        sample_rate: u64,

        /// Number of sample rounds to collect (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        num_samples: usize,

        /// Optional: S3 bucket name to upload partition shards to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress shards before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Summarize the stored dataset into a quality report
    Summarize {
        /// Directory holding the partitioned dataset
        #[arg(short, long, default_value = "data/weather")]
        data_dir: String,

        /// File to write the report to
        #[arg(short, long, default_value = "reports/summary.json")]
        output: String,

        /// Optional: S3 bucket to upload the report to
        #[arg(long)]
        s3_bucket: Option<String>,
    },
    /// Grade the project from the summary report and repository metadata
    Grade {
        /// Local summary report to grade from
        #[arg(short = 'i', long, default_value = "reports/summary.json")]
        summary: String,

        /// File to write the grading document to
        #[arg(short, long, default_value = "reports/grading_summary.json")]
        output: String,

        /// Optional: S3 bucket to read the summary from and upload the result to
        #[arg(long)]
        s3_bucket: Option<String>,
    },
    /// List the configured sampling locations
    ListLocations {
        /// Optional JSON file with the location catalog
        #[arg(short, long)]
        locations: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/weather_grader.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("weather_grader.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect {
            data_dir,
            locations,
            concurrency,
            sample_rate,
            num_samples,
            s3_bucket,
            gzip,
        } => {
            collect(
                &data_dir,
                locations,
                concurrency,
                sample_rate,
                num_samples,
                s3_bucket,
                gzip,
            )
            .await?;
        }
        Commands::Summarize {
            data_dir,
            output,
            s3_bucket,
        } => {
            generate_summary_report(
                Path::new(&data_dir),
                Path::new(&output),
                &SummaryConfig::default(),
                s3_bucket.as_deref(),
            )
            .await?;
        }
        Commands::Grade {
            summary,
            output,
            s3_bucket,
        } => {
            grade(&summary, &output, s3_bucket).await?;
        }
        Commands::ListLocations { locations } => {
            let catalog = load_locations(locations)?;

            for (province, coords) in catalog.iter() {
                info!(province = %province, lat = coords.lat, lon = coords.lon, "Location");
            }

            info!(total = catalog.len(), "Location catalog summary");
        }
    }

    Ok(())
}

fn load_locations(locations_file: Option<String>) -> Result<LocationConfig> {
    match locations_file {
        Some(path) => LocationConfig::load(&path),
        None => Ok(LocationConfig::default()),
    }
}

/// Samples every configured location concurrently, collecting rounds at a
/// configurable interval and optionally uploading the partition shards to
/// S3 afterwards.
#[tracing::instrument(
    skip(locations_file, s3_bucket, gzip),
    fields(data_dir, concurrency, sample_rate, num_samples)
)]
async fn collect(
    data_dir: &str,
    locations_file: Option<String>,
    concurrency: usize,
    sample_rate: u64,
    num_samples: usize,
    s3_bucket: Option<String>,
    gzip: bool,
) -> Result<()> {
    let api_key = std::env::var("OPENWEATHER_API_KEY").expect("OPENWEATHER_API_KEY must be set");

    let catalog = load_locations(locations_file)?;
    let locations: Vec<Location> = catalog
        .iter()
        .map(|(province, coords)| Location {
            province: province.to_string(),
            lat: coords.lat,
            lon: coords.lon,
        })
        .collect();

    info!(
        location_count = locations.len(),
        "Locations ready for sampling"
    );

    let client = Arc::new(OpenWeatherClient::new(api_key)?);

    // Initialize S3 client if bucket is provided
    let s3_client = if s3_bucket.is_some() {
        let config = aws_config::load_from_env().await;
        Some(aws_sdk_s3::Client::new(&config))
    } else {
        None
    };

    if let Some(ref bucket) = s3_bucket {
        info!(bucket = %bucket, gzip, "S3 upload enabled");
    }

    if num_samples == 0 {
        info!(sample_rate, "Sampling infinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, sample_rate, "Starting sample collection");
    }

    std::fs::create_dir_all(data_dir)?;

    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency));

    let mut sample_count = 0;

    loop {
        // Check if we've reached the sample limit (0 = infinite)
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }

        sample_count += 1;

        info!(
            sample = sample_count,
            total = if num_samples == 0 {
                None
            } else {
                Some(num_samples)
            },
            "Starting sample round"
        );

        let mut tasks = vec![];

        for location in &locations {
            let sem = semaphore.clone();
            let client = client.clone();
            let location = location.clone();
            let data_dir = data_dir.to_string();

            let location_span = tracing::info_span!(
                "sample_location",
                province = %location.province,
            );

            let task = tokio::spawn(
                async move {
                    let _permit = sem.acquire().await.unwrap();

                    let captured_at = Utc::now();
                    match client.current_weather(&location).await {
                        Ok(observation) => {
                            let record = WeatherRecord::from_observation(
                                &location.province,
                                &observation,
                                captured_at,
                                local_offset(),
                            );
                            match append_record(Path::new(&data_dir), &record) {
                                Ok(_) => {
                                    info!(
                                        temperature = record.temperature,
                                        humidity = record.humidity,
                                        "Observation recorded"
                                    );
                                    true
                                }
                                Err(e) => {
                                    error!(error = %e, "Failed to write record");
                                    false
                                }
                            }
                        }
                        Err(e) => {
                            // The round just misses this location's tick.
                            error!(error = %e, "Weather fetch failed");
                            false
                        }
                    }
                }
                .instrument(location_span),
            );

            tasks.push(task);
        }

        let mut successes = 0usize;
        for task in tasks {
            if matches!(task.await, Ok(true)) {
                successes += 1;
            }
        }

        if successes == 0 {
            anyhow::bail!("all weather fetches failed in sample round {sample_count}");
        }

        info!(
            successes,
            failures = locations.len() - successes,
            "Sample round complete"
        );

        // If not the last sample, wait before next iteration
        if num_samples == 0 || sample_count < num_samples {
            info!(sample_rate, "Waiting before next sample");
            tokio::time::sleep(tokio::time::Duration::from_secs(sample_rate)).await;
        }
    }

    if let (Some(bucket), Some(s3)) = (&s3_bucket, &s3_client) {
        upload_partitions(s3, bucket, data_dir, gzip).await?;
    }

    info!(data_dir, "Finished sample collection");
    Ok(())
}

/// Grades the project: summary document + repository metadata → rubric
/// scores. Either input failing to load zeroes its criteria instead of
/// failing the run.
#[tracing::instrument(skip(s3_bucket), fields(summary_path, output))]
async fn grade(summary_path: &str, output: &str, s3_bucket: Option<String>) -> Result<()> {
    let config = GradingConfig::default();

    let s3_client = if s3_bucket.is_some() {
        let aws = aws_config::load_from_env().await;
        Some(aws_sdk_s3::Client::new(&aws))
    } else {
        None
    };

    let summary: Option<DatasetSummary> = match (&s3_bucket, &s3_client) {
        (Some(bucket), Some(client)) => {
            match read_json_from_s3(client, bucket, SUMMARY_KEY).await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!(error = %e, bucket = %bucket, key = SUMMARY_KEY, "Failed to load summary document");
                    None
                }
            }
        }
        _ => match load_local_summary(summary_path) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, path = summary_path, "Failed to load summary document");
                None
            }
        },
    };

    let owner = std::env::var("GITHUB_REPO_OWNER").expect("GITHUB_REPO_OWNER must be set");
    let repo = std::env::var("GITHUB_REPO_NAME").expect("GITHUB_REPO_NAME must be set");
    let token = std::env::var("GITHUB_TOKEN").ok();

    let repository = match GithubClient::new(owner, repo, token, &config) {
        Ok(client) => match client.repository_metadata().await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(error = %e, "Failed to fetch repository metadata");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "Failed to build repository client");
            None
        }
    };

    let grading = final_grading(summary.as_ref(), repository.as_ref(), &config);
    write_json_file(Path::new(output), &grading)?;

    if let (Some(bucket), Some(client)) = (&s3_bucket, &s3_client) {
        write_json_to_s3(client, bucket, GRADING_KEY, &grading).await?;
        info!(bucket = %bucket, key = GRADING_KEY, "Grading document uploaded");
    }

    info!(
        score = grading.total.score,
        max_score = grading.total.max_score,
        output,
        "Grading complete"
    );
    Ok(())
}

fn load_local_summary(path: &str) -> Result<DatasetSummary> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Uploads every partition shard and the schema sidecar under `data_dir`
/// to S3, optionally gzip-compressing the shards.
#[tracing::instrument(skip(client), fields(bucket, data_dir, gzip))]
async fn upload_partitions(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    data_dir: &str,
    gzip: bool,
) -> Result<()> {
    let root = Path::new(data_dir);
    let mut paths = Vec::new();
    collect_upload_paths(root, &mut paths)?;
    paths.sort();

    let mut upload_count = 0;

    for path in paths {
        let rel = path
            .strip_prefix(root)?
            .to_string_lossy()
            .replace('\\', "/");
        let contents = std::fs::read(&path)?;

        let is_shard = path.extension().and_then(OsStr::to_str) == Some("csv");
        let (body, key) = if gzip && is_shard {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&contents)?;
            let compressed = encoder.finish()?;
            (compressed, format!("data/weather/{rel}.gz"))
        } else {
            (contents, format!("data/weather/{rel}"))
        };

        client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .send()
            .await?;

        upload_count += 1;
    }

    info!(upload_count, "S3 upload complete");
    Ok(())
}

fn collect_upload_paths(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_upload_paths(&path, out)?;
        } else if matches!(
            path.extension().and_then(OsStr::to_str),
            Some("csv") | Some("json")
        ) {
            out.push(path);
        }
    }
    Ok(())
}
