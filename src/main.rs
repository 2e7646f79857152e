use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cyclebook::cli::{
    handle_cycle_command, handle_export_command, handle_holiday_command, handle_report_command,
    handle_transaction_command, CycleCommands, ExportArgs, HolidayCommands, ReportCommands,
    TransactionCommands,
};
use cyclebook::config::{paths::CyclePaths, settings::Settings};
use cyclebook::storage::Storage;

#[derive(Parser)]
#[command(
    name = "cyclebook",
    version,
    about = "Credit card invoice-cycle accounting",
    long_about = "cyclebook tracks expenses against the credit card invoice they are \
                  billed on. It understands a change of closing day, spreads \
                  installment purchases across invoices, compares periods of \
                  different lengths and derives a monthly spending cap."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Invoice cycle lookups
    #[command(subcommand)]
    Cycle(CycleCommands),

    /// Generate reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Holiday counts used by the spending cap
    #[command(subcommand)]
    Holiday(HolidayCommands),

    /// Export expanded entries to CSV, JSON or YAML
    Export(ExportArgs),

    /// Initialize the data directory and write default settings
    Init,

    /// Show current configuration and paths
    Config {
        /// Print the full settings as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so reports and exports on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = CyclePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Cycle(cmd)) => {
            handle_cycle_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Holiday(cmd)) => {
            handle_holiday_command(&storage, cmd)?;
        }
        Some(Commands::Export(args)) => {
            handle_export_command(&storage, &settings, args)?;
        }
        Some(Commands::Init) => {
            println!("Initializing cyclebook at: {}", paths.base_dir().display());
            if paths.is_initialized() {
                println!("Existing settings kept: {}", paths.settings_file().display());
            } else {
                settings.save(&paths)?;
            }
            storage.save_all()?;
            println!("Initialization complete!");
            println!();
            println!(
                "Transition invoice: {} ({} to {})",
                settings.cycle.transition_invoice_month(),
                settings.cycle.change_date,
                settings.cycle.transition_end
            );
            println!("Run 'cyclebook txn add --help' to record an expense.");
        }
        Some(Commands::Config { json }) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
                return Ok(());
            }

            println!("cyclebook Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  UTC offset:        {}", settings.civil_offset());
            println!("  Currency symbol:   {}", settings.currency_symbol);
            println!("  Date format:       {}", settings.date_format);
            println!("  Legacy reset day:  {}", settings.cycle.reset_day_old);
            println!("  New reset day:     {}", settings.cycle.reset_day_new);
            println!(
                "  Transition:        {} to {} (invoice {})",
                settings.cycle.change_date,
                settings.cycle.transition_end,
                settings.cycle.transition_invoice_month()
            );
            println!("  Cap active from:   {}", settings.cap.cap_activation);
        }
        None => {
            println!("cyclebook - credit card invoice-cycle accounting");
            println!();
            println!("Run 'cyclebook --help' for usage information.");
        }
    }

    Ok(())
}
