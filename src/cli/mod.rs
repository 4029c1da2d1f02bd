use std::io::{Read, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::application::{AppError, LedgerService};
use crate::domain::{ReportOrder, format_money, parse_cents, parse_date};

/// Moneybook - Personal Finance Tracker
#[derive(Parser, Debug)]
#[command(name = "moneybook")]
#[command(about = "Record transactions per user and report their balance")]
#[command(version)]
pub struct Cli {
    /// Ledger database file path
    #[arg(
        short,
        long,
        global = true,
        env = "MONEYBOOK_DB",
        default_value = "moneybook.db"
    )]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a transaction to a user's ledger
    Add {
        /// User profile name
        name: String,

        /// Signed amount: positive for income, negative for expense (e.g., "100" or "-30.50")
        #[arg(allow_negative_numbers = true)]
        amount: String,

        /// Transaction date (YYYY-MM-DD)
        date: String,

        /// Transaction description
        description: String,
    },

    /// Print every transaction of a user followed by the balance
    Report {
        /// User profile name
        name: String,

        /// List transactions by date instead of insertion order
        #[arg(long)]
        by_date: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Show the current balance of a user
    Balance {
        /// User profile name
        name: String,
    },

    /// Delete a user and all of their transactions
    #[command(name = "remove_user", alias = "remove-user")]
    RemoveUser {
        /// User profile name
        name: String,
    },

    /// List all users
    Users,

    /// Export ledgers to JSON or CSV
    #[command(subcommand)]
    Export(ExportCommands),

    /// Import ledgers from a JSON snapshot or a profiles.json file
    #[command(subcommand)]
    Import(ImportCommands),
}

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Every ledger as a JSON snapshot
    Json {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// One user's ledger as CSV
    Csv {
        /// User profile name
        name: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Append every transaction of a JSON snapshot
    Json {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Append every transaction of a profiles.json document
    /// (user name -> transactions with unsigned amount and Income/Expense type)
    Profiles {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

impl Cli {
    /// Install the tracing subscriber. Logs go to stderr; `RUST_LOG` overrides `--verbose`.
    pub fn init_logging(&self) {
        let default_directive = if self.verbose {
            "moneybook=debug"
        } else {
            "moneybook=warn"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub async fn run(self) -> Result<()> {
        let mut stdout = std::io::stdout();
        self.execute(&mut stdout).await
    }

    /// Run the command, writing user-facing messages to `out`.
    pub async fn execute(self, out: &mut dyn Write) -> Result<()> {
        let service = LedgerService::open(&self.database)
            .await
            .with_context(|| format!("Failed to open ledger: {}", self.database))?;

        match self.command {
            Commands::Add {
                name,
                amount,
                date,
                description,
            } => {
                let amount_cents = parse_cents(&amount)
                    .map_err(|e| AppError::InvalidAmount(format!("'{}' ({})", amount, e)))?;
                let date = parse_date(&date)
                    .map_err(|e| AppError::InvalidDate(format!("'{}' ({})", date, e)))?;

                service
                    .add_transaction(&name, amount_cents, date, description)
                    .await?;
                writeln!(out, "Transaction added successfully.")?;
            }

            Commands::Report {
                name,
                by_date,
                format,
            } => {
                let order = if by_date {
                    ReportOrder::Date
                } else {
                    ReportOrder::Inserted
                };
                run_report_command(&service, out, &name, order, format).await?;
            }

            Commands::Balance { name } => {
                let entry = service.get_balance(&name).await?;
                writeln!(
                    out,
                    "Current Balance for {}: {}",
                    entry.user,
                    format_money(entry.balance)
                )?;
            }

            Commands::RemoveUser { name } => {
                service.remove_user(&name).await?;
                writeln!(out, "User profile '{}' removed successfully.", name)?;
            }

            Commands::Users => {
                let users = service.list_users().await?;
                if users.is_empty() {
                    writeln!(out, "No users found.")?;
                } else {
                    for user in users {
                        writeln!(out, "{}", user)?;
                    }
                }
            }

            Commands::Export(export_cmd) => {
                run_export_command(&service, export_cmd).await?;
            }

            Commands::Import(import_cmd) => {
                run_import_command(&service, out, import_cmd).await?;
            }
        }

        Ok(())
    }
}

async fn run_report_command(
    service: &LedgerService,
    out: &mut dyn Write,
    name: &str,
    order: ReportOrder,
    format: ReportFormat,
) -> Result<()> {
    let report = service.generate_report(name, order).await?;

    match format {
        ReportFormat::Text => writeln!(out, "{}", report)?,
        ReportFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
    }
    Ok(())
}

fn open_output(output: Option<&str>) -> Result<Box<dyn Write>> {
    use std::fs::File;
    use std::io::stdout;

    Ok(match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    })
}

async fn run_export_command(service: &LedgerService, cmd: ExportCommands) -> Result<()> {
    use crate::io::Exporter;

    let exporter = Exporter::new(service);

    match cmd {
        ExportCommands::Json { output } => {
            let writer = open_output(output.as_deref())?;
            let snapshot = exporter.export_json(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} users", snapshot.users.len());
            }
        }
        ExportCommands::Csv { name, output } => {
            let writer = open_output(output.as_deref())?;
            let count = exporter.export_user_csv(&name, writer).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions for {}", count, name);
            }
        }
    }
    Ok(())
}

fn open_input(input: Option<&str>) -> Result<Box<dyn Read>> {
    use std::fs::File;
    use std::io::stdin;

    Ok(match input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open input file: {}", path))?,
        ),
        None => Box::new(stdin()),
    })
}

async fn run_import_command(
    service: &LedgerService,
    out: &mut dyn Write,
    cmd: ImportCommands,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};

    let importer = Importer::new(service);

    let (result, dry_run) = match cmd {
        ImportCommands::Json { input, dry_run } => {
            let reader = open_input(input.as_deref())?;
            let result = importer
                .import_json(reader, ImportOptions { dry_run })
                .await?;
            (result, dry_run)
        }
        ImportCommands::Profiles { input, dry_run } => {
            let reader = open_input(input.as_deref())?;
            let result = importer
                .import_profiles(reader, ImportOptions { dry_run })
                .await?;
            (result, dry_run)
        }
    };

    if dry_run {
        writeln!(
            out,
            "Dry run: would import {} transactions for {} users",
            result.transactions, result.users
        )?;
    } else {
        writeln!(
            out,
            "Imported {} transactions for {} users",
            result.transactions, result.users
        )?;
    }
    Ok(())
}
