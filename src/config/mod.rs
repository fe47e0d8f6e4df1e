mod errors;

use std::collections::VecDeque;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::level_filters::LevelFilter;

use crate::engine::DEFAULT_CACHE_CAPACITY;
use crate::report::DEFAULT_HISTOGRAM_BINS;

pub use errors::ConfigError;

pub const USAGE: &str = "\
Usage:
  psp-router select <transactions.csv> <country> <card> <amount> <3d_secure> [options]
  psp-router batch <transactions.csv> <queries.csv> [options] > [output].csv
  psp-router report <transactions.csv> [options]

Options:
  --fees <fees.csv>      fee table with columns PSP,fee_successful,fee_failed
  --log-level <level>    error, warn, info, debug, trace (default: error)
  --bins <n>             histogram bins for report (default: 30)
  --cache-capacity <n>   memoized batch queries (default: 10000)
  --cache-ttl-ms <ms>    lifetime of a memoized batch query (default: unlimited)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Raw form input, validated by the selector.
    Select {
        country: String,
        card_type: String,
        amount: String,
        three_d_secure: String
    },
    Batch {
        queries: PathBuf,
        cache_capacity: u64,
        cache_ttl: Option<Duration>
    },
    Report {
        bins: usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub command: Command,
    pub dataset: PathBuf,
    pub fees: Option<PathBuf>,
    pub log_level: LevelFilter
}

impl Config {
    /// Parses the arguments following the program name.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut positional = VecDeque::new();
        let mut fees = None;
        let mut log_level = LevelFilter::ERROR;
        let mut bins = None;
        let mut cache_capacity = None;
        let mut cache_ttl = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--fees" => fees = Some(PathBuf::from(option_value(&arg, args.next())?)),
                "--log-level" => log_level = parse_log_level(&option_value(&arg, args.next())?),
                "--bins" => bins = Some(positive_number::<usize>(&arg, args.next())?),
                "--cache-capacity" => cache_capacity = Some(positive_number::<u64>(&arg, args.next())?),
                "--cache-ttl-ms" => cache_ttl = Some(Duration::from_millis(positive_number::<u64>(&arg, args.next())?)),
                _ => positional.push_back(arg)
            }
        }

        let name = positional.pop_front().ok_or(ConfigError::MissingCommand)?;
        let dataset = PathBuf::from(required(&mut positional, "transactions.csv")?);

        let command = match name.as_str() {
            "select" => Command::Select {
                country: required(&mut positional, "country")?,
                card_type: required(&mut positional, "card")?,
                amount: required(&mut positional, "amount")?,
                three_d_secure: required(&mut positional, "3d_secure")?
            },
            "batch" => Command::Batch {
                queries: PathBuf::from(required(&mut positional, "queries.csv")?),
                cache_capacity: cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
                cache_ttl
            },
            "report" => Command::Report {
                bins: bins.unwrap_or(DEFAULT_HISTOGRAM_BINS)
            },
            _ => return Err(ConfigError::UnknownCommand(name))
        };

        if let Some(extra) = positional.pop_front() {
            return Err(ConfigError::UnexpectedArgument(extra));
        }

        Ok(Self { command, dataset, fees, log_level })
    }
}

fn option_value(flag: &str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn positive_number<T>(flag: &str, value: Option<String>) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialOrd,
{
    let value = option_value(flag, value)?;

    value.parse::<T>()
        .ok()
        .filter(|number| *number > T::default())
        .ok_or_else(|| ConfigError::InvalidValue { flag: flag.to_string(), value })
}

fn required(positional: &mut VecDeque<String>, name: &'static str) -> Result<String, ConfigError> {
    positional.pop_front().ok_or(ConfigError::MissingArgument(name))
}

pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}
