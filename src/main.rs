mod annotator;
mod config;
mod engine;
mod models;
mod report;
mod selector;
mod storage;
mod types;

use std::io::{stderr, stdout, BufWriter, Write};
use std::process::{exit, ExitCode};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use csv::Writer;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::config::{Command, Config, USAGE};
use crate::engine::BatchEngine;
use crate::models::{FeeTable, SelectionOutcome};
use crate::report::DatasetReport;
use crate::selector::select_from_input;
use crate::storage::{read_fee_table, CsvRecordSource, Dataset, ResultStorage};

const INVALID_INPUT_EXIT_CODE: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            eprintln!("{USAGE}");
            exit(1);
        }
    };

    setup_logging(config.log_level);

    let fee_table = match &config.fees {
        Some(path) => read_fee_table(path)?,
        None => FeeTable::default()
    };

    let timer = Instant::now();
    let dataset = Arc::new(Dataset::load(&CsvRecordSource::new(&config.dataset), &fee_table)?);

    info!("Loaded {} records in: {:?}", dataset.len(), timer.elapsed());

    if dataset.is_empty() {
        warn!("Dataset {} contains no usable records", config.dataset.display());
    }

    match config.command {
        Command::Select { country, card_type, amount, three_d_secure } => {
            match select_from_input(dataset.records(), &country, &card_type, &amount, &three_d_secure) {
                Ok(outcome) => {
                    if let Some(result) = outcome.selected() {
                        info!("Selected [{}] with success rate {:.4} over {} matched records", result.provider, result.success_rate, result.matched);
                    }

                    println!("{outcome}");
                }
                Err(error) => {
                    println!("Entered wrong input. Please enter a valid input. ({error})");
                    return Ok(ExitCode::from(INVALID_INPUT_EXIT_CODE));
                }
            }
        }
        Command::Batch { queries, cache_capacity, cache_ttl } => {
            let storage = Arc::new(ResultStorage::new());
            let mut engine = BatchEngine::new(dataset, storage.clone())
                .with_cache_capacity(cache_capacity);

            if let Some(timeout) = cache_ttl {
                engine = engine.with_cache_timeout(timeout);
            }

            let timer = Instant::now();
            engine.run(&queries.to_string_lossy()).await?;

            info!("Processed {} queries in: {:?}", storage.len(), timer.elapsed());

            write_results_to_stdout(&storage)?;
        }
        Command::Report { bins } => {
            let mut output = BufWriter::new(stdout().lock());
            write!(output, "{}", DatasetReport::build(&dataset, bins))?;
            output.flush()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn setup_logging(level: LevelFilter) {
    //NOTE: Results are written to stdout, logging has to stay on stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_results_to_stdout(storage: &ResultStorage) -> Result<()> {
    let mut output = Writer::from_writer(BufWriter::new(stdout().lock()));

    output.write_record(["line", "country", "card", "amount", "3D_secured", "status", "PSP", "success_rate", "fee_successful", "fee_failed"])?;

    for outcome in storage.sorted() {
        let (status, provider, success_rate, success_fee, failure_fee) = match &outcome.result {
            Ok(SelectionOutcome::Selected(result)) => {
                let fees = result.fees();
                ("selected", result.provider.clone(), format!("{:.4}", result.success_rate), fees.success_fee.to_string(), fees.failure_fee.to_string())
            }
            Ok(SelectionOutcome::NoMatch) => ("no_match", String::new(), String::new(), String::new(), String::new()),
            Err(_) => ("invalid_input", String::new(), String::new(), String::new(), String::new())
        };

        let line = outcome.line.to_string();

        output.write_record([
            line.as_str(),
            outcome.country.as_str(),
            outcome.card_type.as_str(),
            outcome.amount.as_str(),
            outcome.three_d_secure.as_str(),
            status,
            provider.as_str(),
            success_rate.as_str(),
            success_fee.as_str(),
            failure_fee.as_str()
        ])?;
    }

    output.flush()?;

    Ok(())
}
