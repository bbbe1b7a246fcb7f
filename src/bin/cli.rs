//! recordstore CLI
//!
//! Inspect and edit a record file directly, without the server. Do not
//! point it at a file that a running server has open.

use std::path::Path;
use std::process::ExitCode;

use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use recordstore::{Engine, Record};
use tracing_subscriber::{fmt, EnvFilter};

/// recordstore CLI
#[derive(Parser, Debug)]
#[command(name = "recordstore-cli")]
#[command(about = "CLI for recordstore record files")]
struct Args {
    /// Record file
    #[arg(short, long, default_value = "./records.bin")]
    file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a record by id
    Get {
        /// The id to read
        id: i64,
    },

    /// Create a record and print its id
    Create(Fields),

    /// Replace the fields of a record
    Update {
        /// The id to update
        id: i64,

        #[command(flatten)]
        fields: Fields,
    },

    /// Delete a record
    #[command(alias = "del")]
    Delete {
        /// The id to delete
        id: i64,
    },

    /// Print every live record, one JSON object per line
    Dump,

    /// Print slot and file statistics
    Stats,
}

#[derive(ClapArgs, Debug)]
struct Fields {
    /// Integer value
    #[arg(long = "int", allow_negative_numbers = true)]
    int_value: i64,

    /// String value (at most 64 bytes)
    #[arg(long = "str")]
    str_value: String,

    /// Boolean flag
    #[arg(long = "bool")]
    bool_value: bool,

    /// RFC 3339 timestamp (defaults to now)
    #[arg(long = "time")]
    time_value: Option<DateTime<FixedOffset>>,
}

impl Fields {
    fn into_record(self) -> Record {
        let time_value = self.time_value.unwrap_or_else(|| Utc::now().into());
        Record::new(self.int_value, self.str_value, self.bool_value, time_value)
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let engine = Engine::open_path(Path::new(&args.file))?;

    let code = match args.command {
        Commands::Get { id } => match engine.get(id)? {
            Some(record) => {
                println!("{}", serde_json::to_string(&record)?);
                ExitCode::SUCCESS
            }
            None => not_found(id),
        },
        Commands::Create(fields) => {
            let id = engine.create(&fields.into_record())?;
            println!("{}", id);
            ExitCode::SUCCESS
        }
        Commands::Update { id, fields } => match engine.update(id, &fields.into_record())? {
            Some(id) => {
                println!("{}", id);
                ExitCode::SUCCESS
            }
            None => not_found(id),
        },
        Commands::Delete { id } => {
            if engine.delete(id)? {
                ExitCode::SUCCESS
            } else {
                not_found(id)
            }
        }
        Commands::Dump => {
            for record in engine.scan()? {
                println!("{}", serde_json::to_string(&record)?);
            }
            ExitCode::SUCCESS
        }
        Commands::Stats => {
            let slots = engine.slot_count();
            let live = engine.scan()?.len() as u64;
            let stats = serde_json::json!({
                "file": engine.data_file().display().to_string(),
                "file_len": engine.file_len(),
                "slots": slots,
                "live": live,
                "tombstones": slots - live,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
            ExitCode::SUCCESS
        }
    };

    engine.close()?;
    Ok(code)
}

fn not_found(id: i64) -> ExitCode {
    eprintln!("record {} not found", id);
    ExitCode::from(2)
}
