use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use seatsmart::{
    Config, FileStore, GeminiNameGenerator, ReassignStatus, SeatingPlan, Session, Table, TableId,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seatsmart")]
#[command(about = "Turn a guest list into a seating plan")]
struct Cli {
    /// Config file (default: ./seatsmart.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Plan to work on
    #[arg(long, global = true, default_value = "default")]
    plan: String,

    /// Log engine details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a new plan under a fresh id and print it
    New {
        /// Number of tables (default from config)
        #[arg(long)]
        count: Option<usize>,

        /// Seats per table (default from config)
        #[arg(long)]
        capacity: Option<u32>,
    },

    /// Replace all tables; every guest loses their seat
    Tables {
        #[arg(long)]
        count: Option<usize>,

        #[arg(long)]
        capacity: Option<u32>,
    },

    /// Replace the guest list with names from a file (`-` for stdin)
    Import {
        /// One name per line or comma-separated
        file: PathBuf,
    },

    /// Add guests to the list, skipping names already on it
    Add {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Seat everyone from scratch, filling tables in order
    Auto,

    /// Move guests (by id or name) to a table
    Assign {
        /// Target table id, e.g. table-3
        #[arg(long)]
        table: String,

        #[arg(required = true)]
        guests: Vec<String>,
    },

    /// Rename a table
    Rename { table: String, name: String },

    /// Generate table names on a theme
    NameTables {
        #[arg(long)]
        theme: String,
    },

    /// Find a seated guest by (part of) their name
    Lookup { query: String },

    /// Print the plan
    Show {
        /// Print as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the link guests use to find their seat
    Share,

    /// List theme suggestions for table names
    Themes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "seatsmart=debug"
    } else {
        "seatsmart=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let store = FileStore::new(&config.store_dir);

    let plan_id = match cli.command {
        Command::New { .. } => seatsmart::new_plan_id(),
        _ => cli.plan,
    };
    let mut session = Session::open(store, &plan_id, config)?;

    match cli.command {
        Command::New { count, capacity } => {
            let count = count.unwrap_or(session.config().table_count);
            let capacity = capacity.unwrap_or(session.config().table_capacity);
            session.regenerate_tables(count, capacity)?;
            println!("Created plan {plan_id} with {count} tables of {capacity}");
            println!("Share: {}", session.share_url());
        }
        Command::Tables { count, capacity } => {
            let count = count.unwrap_or(session.config().table_count);
            let capacity = capacity.unwrap_or(session.config().table_capacity);
            session.regenerate_tables(count, capacity)?;
            println!("{count} tables of {capacity}; all guests are unseated");
        }
        Command::Import { file } => {
            let raw = read_input(&file)?;
            let count = session.import_guests(&raw)?;
            println!("Imported {count} guests");
        }
        Command::Add { names } => {
            let outcome = session.add_guests(&names.join("\n"))?;
            if !outcome.skipped.is_empty() {
                println!("Already on the list, skipped: {}", outcome.skipped.join(", "));
            }
            if outcome.changed() {
                println!("Added {} guests", outcome.added.len());
            } else {
                println!("No new guests added");
            }
        }
        Command::Auto => {
            let unassigned = session.auto_assign()?;
            if unassigned.is_empty() {
                println!("✓ Everyone has a seat");
            } else {
                println!("✗ {} guests did not fit:", unassigned.len());
                for guest in &unassigned {
                    println!("  {}", guest.display_name);
                }
            }
        }
        Command::Assign { table, guests } => {
            let table = TableId::from(table);
            let out = session.assign_to_table(&guests, &table)?;
            for id in &out.unknown_guests {
                println!("  ? no guest '{id}'");
            }
            match out.status {
                ReassignStatus::Complete => println!("✓ Moved to {table}"),
                ReassignStatus::TableNotFound { table_id } => {
                    println!("✗ No table '{table_id}'; the guests are now unassigned");
                }
                ReassignStatus::CapacityReached {
                    seated,
                    left_unassigned,
                } => {
                    println!(
                        "✗ {table} is full after {seated}; {} left unassigned",
                        left_unassigned.len()
                    );
                }
            }
        }
        Command::Rename { table, name } => {
            session.rename_table(&TableId::from(table), &name)?;
            println!("Renamed to {name}");
        }
        Command::NameTables { theme } => {
            let generator = GeminiNameGenerator::new(
                session.config().names.clone(),
                seatsmart::api_key_from_env(),
            )?;
            let changed = session.name_tables(&generator, &theme).await?;
            println!("Named {changed} tables after \"{theme}\"");
            print_tables(session.plan());
        }
        Command::Lookup { query } => {
            let matches = session.plan().lookup(&query);
            if matches.is_empty() {
                println!("No seated guest matches \"{query}\"");
            }
            for m in matches {
                println!(
                    "{}: {}, seat {}",
                    m.guest.display_name, m.table_name, m.seat_number
                );
            }
        }
        Command::Show { json } => {
            if json {
                println!("{}", session.plan().to_json()?);
            } else {
                print_plan(session.plan());
            }
        }
        Command::Share => {
            if session.is_new() {
                println!("Plan '{}' has not been saved yet", session.plan_id());
            } else {
                println!("{}", session.share_url());
            }
        }
        Command::Themes => {
            for theme in &session.config().themes {
                println!("{theme}");
            }
        }
    }

    Ok(())
}

fn read_input(file: &Path) -> anyhow::Result<String> {
    if file.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
        Ok(raw)
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read '{}'", file.display()))
    }
}

fn print_table_header(table: &Table) {
    println!(
        "{} ({}) {}/{}",
        table.name,
        table.id,
        table.occupancy(),
        table.capacity
    );
}

fn print_tables(plan: &SeatingPlan) {
    for table in &plan.tables {
        print_table_header(table);
    }
}

fn print_plan(plan: &SeatingPlan) {
    for table in &plan.tables {
        print_table_header(table);
        for id in &table.guests {
            match plan.guest(id) {
                Some(guest) => println!(
                    "  {:>2}. {}",
                    guest.seat_number().unwrap_or_default(),
                    guest.display_name
                ),
                None => println!("   ?. {id}"),
            }
        }
    }

    let unassigned: Vec<_> = plan.unassigned().collect();
    println!(
        "\n{} guests, {} seats, {} unassigned",
        plan.guests.len(),
        plan.total_capacity(),
        unassigned.len()
    );
    for guest in unassigned {
        println!("  {}", guest.display_name);
    }
}
