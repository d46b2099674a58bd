use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use invoice_dash::config::{config_dir, config_file, init_config_dir, resolve_config};
use invoice_dash::dashboard::{
    format_currency, parse_date, ChartMode, FilterState, PaymentAction, PaymentOutcome, Scope,
    SortField, SortOrder,
};
use invoice_dash::error::{DashError, Result};
use invoice_dash::{render, Config, Dashboard, HttpApi, Trigger};

#[derive(Parser)]
#[command(name = "invoice-dash")]
#[command(version, about = "Terminal dashboard for an invoicing API", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.invoice-dash or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// API base URL, overrides api.base_url from config.toml
    #[arg(long, global = true, env = "INVOICE_DASH_API_BASE")]
    api_base: Option<String>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct ScopeArgs {
    /// Customer id (see 'customers')
    #[arg(long)]
    customer: Option<String>,

    /// Invoices dated on or after (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    from: Option<NaiveDate>,

    /// Invoices dated on or before (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    to: Option<NaiveDate>,
}

#[derive(Args, Clone, Default)]
struct ListArgs {
    /// Search invoice number or customer name
    #[arg(short, long)]
    search: Option<String>,

    /// Sort column
    #[arg(long, value_enum)]
    sort: Option<SortField>,

    /// Sort direction
    #[arg(long, value_enum)]
    order: Option<SortOrder>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show the resolved configuration
    Status,

    /// List customers
    Customers,

    /// Show invoiced, received and outstanding totals
    Kpis {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List invoices
    Invoices {
        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Draw the top-customers or monthly chart
    Chart {
        #[arg(short, long, value_enum, default_value_t = ChartMode::Top)]
        mode: ChartMode,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Load and show KPIs, invoices and chart together
    Dashboard {
        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        list: ListArgs,

        #[arg(short, long, value_enum, default_value_t = ChartMode::Top)]
        mode: ChartMode,
    },

    /// Record a payment against an invoice, then refresh the dashboard
    Pay {
        /// Invoice id (as returned by the API)
        invoice_id: i64,

        /// Payment amount
        amount: String,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Invoice number, for display
        #[arg(long)]
        invoice_no: Option<String>,
    },

    /// Interactive session; type 'help' for commands
    Shell {
        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        list: ListArgs,

        #[arg(short, long, value_enum, default_value_t = ChartMode::Top)]
        mode: ChartMode,
    },
}

fn parse_day(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    if let Commands::Init = cli.command {
        return cmd_init(&cfg_dir);
    }

    let config = resolve_config(&cfg_dir, cli.api_base.as_deref())?;

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Status => cmd_status(&cfg_dir, &config),
        Commands::Customers => cmd_customers(&config),
        Commands::Kpis { scope } => cmd_kpis(&config, scope),
        Commands::Invoices { scope, list } => cmd_invoices(&config, scope, list),
        Commands::Chart { mode, scope } => cmd_chart(&config, scope, mode),
        Commands::Dashboard { scope, list, mode } => cmd_dashboard(&config, scope, list, mode),
        Commands::Pay {
            invoice_id,
            amount,
            date,
            invoice_no,
        } => cmd_pay(&config, invoice_id, amount, date, invoice_no),
        Commands::Shell { scope, list, mode } => cmd_shell(&config, scope, list, mode),
    }
}

fn filter_state(scope: ScopeArgs, list: ListArgs, mode: ChartMode) -> FilterState {
    FilterState {
        scope: Scope {
            customer_id: scope.customer,
            from: scope.from,
            to: scope.to,
        },
        search: list.search,
        sort_field: list.sort,
        sort_order: list.order,
        chart_mode: mode,
    }
}

fn open_dashboard(config: &Config, filter: FilterState) -> Dashboard<HttpApi> {
    Dashboard::new(HttpApi::new(&config.api), config.display.currency_symbol.clone())
        .with_filter(filter)
}

/// Initialize config directory with the template
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config_dir(cfg_dir)?;

    println!("Initialized invoice-dash config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point it at your API:  $EDITOR {}",
        config_file(cfg_dir).display()
    );
    println!("  2. Open the dashboard:    invoice-dash dashboard");

    Ok(())
}

/// Show the resolved configuration
fn cmd_status(cfg_dir: &Path, config: &Config) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DashError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    println!("Dashboard Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("API base URL:     {}", config.api.base_url);
    println!("Timeout:          {}s", config.api.timeout_secs);
    println!("Currency symbol:  {}", config.display.currency_symbol);

    Ok(())
}

fn cmd_customers(config: &Config) -> Result<()> {
    let mut dash = open_dashboard(config, FilterState::default());
    dash.load_customers()?;
    println!("{}", render::customers(&dash.state().customers));
    Ok(())
}

fn cmd_kpis(config: &Config, scope: ScopeArgs) -> Result<()> {
    let filter = filter_state(scope, ListArgs::default(), ChartMode::default());
    let mut dash = open_dashboard(config, filter);
    dash.load_kpis()?;
    if let Some(panel) = &dash.state().kpis {
        println!("{}", render::kpis(panel));
    }
    Ok(())
}

fn cmd_invoices(config: &Config, scope: ScopeArgs, list: ListArgs) -> Result<()> {
    let mut dash = open_dashboard(config, filter_state(scope, list, ChartMode::default()));
    dash.load_invoices()?;
    if let Some(table) = &dash.state().invoices {
        println!("{}", render::invoices(table));
    }
    Ok(())
}

fn cmd_chart(config: &Config, scope: ScopeArgs, mode: ChartMode) -> Result<()> {
    let mut dash = open_dashboard(config, filter_state(scope, ListArgs::default(), mode));
    dash.load_chart()?;
    if let Some(chart) = dash.state().chart.current() {
        println!("{}", render::chart(chart, dash.currency_symbol()));
    }
    Ok(())
}

fn cmd_dashboard(config: &Config, scope: ScopeArgs, list: ListArgs, mode: ChartMode) -> Result<()> {
    let mut dash = open_dashboard(config, filter_state(scope, list, mode));
    dash.dispatch(Trigger::InitialLoad)?;
    println!("{}", render::dashboard(dash.state(), dash.currency_symbol()));
    Ok(())
}

fn cmd_pay(
    config: &Config,
    invoice_id: i64,
    amount: String,
    date: Option<String>,
    invoice_no: Option<String>,
) -> Result<()> {
    let mut dash = open_dashboard(config, FilterState::default());
    let action = PaymentAction {
        invoice_id,
        invoice_no: invoice_no.unwrap_or_else(|| invoice_id.to_string()),
    };

    dash.open_payment(&action);
    dash.payment_mut().set_amount(amount);
    if let Some(date) = date {
        dash.payment_mut().set_date(date);
    }

    let entered = dash.payment().amount.clone();
    let outcome = dash.submit_payment()?;

    let shown = entered
        .trim()
        .parse::<f64>()
        .map(|a| format_currency(a, dash.currency_symbol()))
        .unwrap_or(entered);
    println!("Recorded {} payment for {}", shown, action.invoice_no);

    // The payment is stored either way; a failed refresh must not invite a retry.
    match outcome {
        PaymentOutcome::Refreshed => {
            println!();
            println!("{}", render::dashboard(dash.state(), dash.currency_symbol()));
        }
        PaymentOutcome::RefreshFailed(e) => eprintln!("Warning: dashboard refresh failed: {e}"),
    }
    Ok(())
}

#[derive(Parser)]
#[command(no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Set customer and date range, reload everything
    Apply {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Filter invoices by text (no text clears the search)
    Search { text: Vec<String> },
    /// Sort invoices (no arguments restore the server default)
    Sort {
        #[arg(value_enum)]
        field: Option<SortField>,
        /// Direction; keeps the current column when no field is given
        #[arg(short, long, value_enum)]
        order: Option<SortOrder>,
    },
    /// Switch chart mode
    Chart {
        #[arg(value_enum)]
        mode: ChartMode,
    },
    /// Open the payment form for a row of the invoice table
    Pay { row: usize },
    /// Set the payment amount
    Amount { value: String },
    /// Set the payment date (YYYY-MM-DD)
    Date { value: String },
    /// Submit the payment form
    Save,
    /// Close the payment form
    Close,
    /// Show the customer list
    Customers,
    /// Redraw the dashboard
    Show,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

fn cmd_shell(config: &Config, scope: ScopeArgs, list: ListArgs, mode: ChartMode) -> Result<()> {
    let mut dash = open_dashboard(config, filter_state(scope, list, mode));
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();

    match dash.dispatch(Trigger::InitialLoad) {
        Ok(()) => print_dashboard(&dash),
        Err(e) => eprintln!("Error: {e}"),
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                print!("{e}");
                continue;
            }
        };

        match shell_step(&mut dash, command) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    Ok(())
}

/// Run one shell command. Returns `false` to end the session.
fn shell_step(dash: &mut Dashboard<HttpApi>, command: ShellCommand) -> Result<bool> {
    match command {
        ShellCommand::Apply { scope } => {
            let scope = Scope {
                customer_id: scope.customer,
                from: scope.from,
                to: scope.to,
            };
            dash.dispatch(Trigger::ApplyFilters(scope))?;
            print_dashboard(dash);
        }
        ShellCommand::Search { text } => {
            dash.dispatch(Trigger::SearchInput(text.join(" ")))?;
            print_invoices(dash);
        }
        ShellCommand::Sort { field, order } => {
            let trigger = sort_trigger(dash.filter(), field, order);
            dash.dispatch(trigger)?;
            print_invoices(dash);
        }
        ShellCommand::Chart { mode } => {
            dash.dispatch(Trigger::ChartModeChanged(mode))?;
            if let Some(chart) = dash.state().chart.current() {
                println!("{}", render::chart(chart, dash.currency_symbol()));
            }
        }
        ShellCommand::Pay { row } => {
            dash.open_payment_for_row(row)?;
            print_payment_form(dash);
        }
        ShellCommand::Amount { value } => {
            require_open_form(dash)?;
            dash.payment_mut().set_amount(value);
            print_payment_form(dash);
        }
        ShellCommand::Date { value } => {
            require_open_form(dash)?;
            dash.payment_mut().set_date(value);
            print_payment_form(dash);
        }
        ShellCommand::Save => {
            let outcome = dash.submit_payment()?;
            println!("Payment recorded.");
            print_dashboard(dash);
            if let PaymentOutcome::RefreshFailed(e) = outcome {
                return Err(e);
            }
        }
        ShellCommand::Close => dash.close_payment(),
        ShellCommand::Customers => {
            dash.load_customers()?;
            println!("{}", render::customers(&dash.state().customers));
        }
        ShellCommand::Show => {
            print_dashboard(dash);
            if dash.payment().is_open() {
                print_payment_form(dash);
            }
        }
        ShellCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// `sort` alone restores the server default; otherwise whatever is not
/// given keeps its current value.
fn sort_trigger(
    current: &FilterState,
    field: Option<SortField>,
    order: Option<SortOrder>,
) -> Trigger {
    if field.is_none() && order.is_none() {
        return Trigger::SortChanged {
            field: None,
            order: None,
        };
    }
    Trigger::SortChanged {
        field: field.or(current.sort_field),
        order: order.or(current.sort_order),
    }
}

fn require_open_form(dash: &Dashboard<HttpApi>) -> Result<()> {
    if dash.payment().is_open() {
        Ok(())
    } else {
        Err(DashError::PaymentNotOpen)
    }
}

fn print_dashboard(dash: &Dashboard<HttpApi>) {
    println!("{}", render::dashboard(dash.state(), dash.currency_symbol()));
}

fn print_invoices(dash: &Dashboard<HttpApi>) {
    if let Some(table) = &dash.state().invoices {
        println!("{}", render::invoices(table));
    }
}

fn print_payment_form(dash: &Dashboard<HttpApi>) {
    let form = dash.payment();
    println!(
        "Record payment for {}",
        form.invoice_no().unwrap_or("(no invoice)")
    );
    println!("  Amount: {}", form.amount);
    println!("  Date:   {}", form.payment_date);
    println!("Use 'amount', 'date', then 'save' (or 'close').");
}
