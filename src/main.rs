use clap::{Args, Parser, Subcommand, ValueEnum};
use flate2::Compression;
use miette::{IntoDiagnostic, Result};
use quanto::application::settlement::{LargestFirst, RosterOrder};
use quanto::domain::ledger::Ledger;
use quanto::domain::money::EPSILON;
use quanto::domain::ports::SettlementStrategyBox;
use quanto::interfaces::csv::expense_reader::ExpenseReader;
use quanto::interfaces::csv::report_writer::{ReportWriter, write_payment_lines};
use quanto::interfaces::share::ShareCodec;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    source: LedgerSource,

    #[command(subcommand)]
    command: Command,
}

/// Where the ledger comes from. Without any of these the ledger is empty.
#[derive(Args)]
struct LedgerSource {
    /// Share token to load the whole ledger from
    #[arg(long, conflicts_with_all = ["expenses", "participants"])]
    token: Option<String>,

    /// Expenses CSV file with columns item,amount,cost,paid_by,paid_for
    #[arg(long, requires = "participants")]
    expenses: Option<PathBuf>,

    /// Participant name, repeated once per participant in roster order
    #[arg(short, long = "participant", value_name = "NAME")]
    participants: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print every participant's net balance
    Balances,
    /// Print the payments that settle all balances
    Settle {
        #[arg(long, value_enum, default_value_t = Strategy::RosterOrder)]
        strategy: Strategy,

        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Balances and payments at or below this are treated as zero
        #[arg(long, default_value_t = EPSILON)]
        epsilon: Decimal,
    },
    /// Print a share token for the ledger
    Share {
        /// Print a full share URL built on this address instead of the bare token
        #[arg(long)]
        base_url: Option<String>,

        /// zlib compression level
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
        compression_level: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Creditors collect from debtors in roster order
    RosterOrder,
    /// Largest creditor is paid by largest debtor first
    LargestFirst,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Text,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ledger = load_ledger(cli.source)?;

    match cli.command {
        Command::Balances => {
            ReportWriter::new(io::stdout().lock())
                .write_balances(&ledger)
                .into_diagnostic()?;
        }
        Command::Settle {
            strategy,
            format,
            epsilon,
        } => {
            let strategy: SettlementStrategyBox = match strategy {
                Strategy::RosterOrder => Box::new(RosterOrder { epsilon }),
                Strategy::LargestFirst => Box::new(LargestFirst { epsilon }),
            };
            let payments = ledger.settle(strategy.as_ref());

            match format {
                Format::Csv => ReportWriter::new(io::stdout().lock())
                    .write_payments(&ledger, &payments)
                    .into_diagnostic()?,
                Format::Text => {
                    write_payment_lines(io::stdout().lock(), &ledger, &payments).into_diagnostic()?
                }
            }
        }
        Command::Share {
            base_url,
            compression_level,
        } => {
            let codec = ShareCodec {
                compression: Compression::new(compression_level),
                ..ShareCodec::default()
            };
            let token = codec.encode(&ledger).into_diagnostic()?;
            let output = match base_url {
                Some(base) => token.share_url(&base),
                None => token.into_string(),
            };
            writeln!(io::stdout().lock(), "{output}").into_diagnostic()?;
        }
    }

    Ok(())
}

fn load_ledger(source: LedgerSource) -> Result<Ledger> {
    if let Some(token) = source.token {
        return Ok(quanto::decode(&token).unwrap_or_else(|err| {
            tracing::warn!("{err}, starting from an empty ledger");
            Ledger::new()
        }));
    }

    let mut ledger = Ledger::new();
    for name in source.participants {
        ledger.add_participant(name).into_diagnostic()?;
    }
    if let Some(path) = source.expenses {
        let file = File::open(path).into_diagnostic()?;
        ExpenseReader::new(file)
            .read_into(&mut ledger)
            .into_diagnostic()?;
    }
    Ok(ledger)
}

/// Logs go to stderr so stdout only ever carries report data.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}
