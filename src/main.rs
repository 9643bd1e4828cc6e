//! Operator CLI for the studio back office.
//!
//! Thin shell over the library: every command signs into the persisted
//! session, builds a coordinator (which bootstraps against the active
//! backend), performs one operation, and prints the mode indicator so the
//! operator always sees whether they are online and against which backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use studiodesk::backup;
use studiodesk::cache::CacheStore;
use studiodesk::config::StudioConfig;
use studiodesk::ledger::{LineItem, PaymentEntry};
use studiodesk::model::{ClientRecord, ContactRecord, ShootStatus, StorageMode};
use studiodesk::session::Session;
use studiodesk::sync::SyncCoordinator;
use studiodesk::ClientFilter;

#[derive(Parser)]
#[command(name = "studiodesk", version, about = "Local-first studio back office")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and hydrate from the active backend
    Login {
        /// Operator name recorded on the session
        operator: String,
    },
    /// Sign out, clearing the session flag (cached records stay)
    Logout,
    /// List bookings, optionally filtered
    List {
        /// Case-insensitive text over name/phone/event type/location
        #[arg(long)]
        query: Option<String>,
        /// Pending, Editing, Completed or Cancelled
        #[arg(long)]
        status: Option<String>,
        #[arg(long = "event-type")]
        event_type: Option<String>,
        /// Earliest event date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest event date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Record a new booking
    AddClient {
        name: String,
        phone: String,
        #[arg(long = "event-type")]
        event_type: String,
        #[arg(long = "event-date")]
        event_date: NaiveDate,
        /// Flat total for bookings without line items
        #[arg(long)]
        total: Option<Decimal>,
        #[arg(long)]
        package: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Add an itemized charge to a booking
    AddItem {
        client_id: String,
        description: String,
        amount: Decimal,
    },
    /// Record a payment against a booking
    AddPayment {
        client_id: String,
        amount: Decimal,
        #[arg(long, default_value = "cash")]
        method: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Change a booking's status
    SetStatus { client_id: String, status: String },
    /// Delete a booking (irreversible)
    DeleteClient { id: String },
    /// List address-book contacts
    Contacts,
    /// Add an address-book contact
    AddContact {
        name: String,
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Delete an address-book contact
    DeleteContact { id: String },
    /// Dashboard statistics
    Stats,
    /// Show or switch the storage mode
    Mode {
        /// local, relational or document_cloud; omit to show
        value: Option<String>,
    },
    /// Retry the active backend after working offline
    Resync,
    /// Export the booking collection
    Export {
        /// json or sql
        #[arg(long, default_value = "json")]
        format: String,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the booking collection from a JSON backup
    Import { file: PathBuf },
    /// Show the studio profile
    Profile,
    /// Update studio profile fields
    SetProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long = "tax-id")]
        tax_id: Option<String>,
    },
}

fn parse_status(raw: &str) -> anyhow::Result<ShootStatus> {
    ShootStatus::from_str_value(raw)
        .with_context(|| format!("unknown status '{raw}'; expected Pending, Editing, Completed or Cancelled"))
}

fn find_client(coordinator: &SyncCoordinator, id: &str) -> anyhow::Result<ClientRecord> {
    coordinator
        .clients()
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .with_context(|| format!("no booking with id '{id}'"))
}

fn print_booking_line(record: &ClientRecord, currency: &str) {
    println!(
        "{}  {:<24} {:<12} {}  due {}{}",
        record.event_date,
        record.name,
        record.status.as_str(),
        record.id,
        currency,
        record.due_amount
    );
}

async fn open_coordinator(
    config: StudioConfig,
    cache: Arc<CacheStore>,
) -> anyhow::Result<SyncCoordinator> {
    let Some(session) = Session::restore(&cache) else {
        bail!("not signed in; run `studiodesk login <operator>` first");
    };
    Ok(SyncCoordinator::start(session, config, cache).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = StudioConfig::resolve()?;
    let cache = Arc::new(CacheStore::open(&config.data_dir)?);

    if let Command::Login { operator } = &cli.command {
        let session = Session::sign_in(&cache, operator.clone())?;
        let coordinator = SyncCoordinator::start(session, config, cache).await?;
        println!(
            "signed in as {} - {}",
            coordinator.session().operator,
            coordinator.indicator()
        );
        return Ok(());
    }

    if let Command::Logout = &cli.command {
        match Session::restore(&cache) {
            Some(session) => {
                session.sign_out(&cache)?;
                println!("signed out");
            }
            None => println!("no active session"),
        }
        return Ok(());
    }

    let mut coordinator = open_coordinator(config, cache).await?;
    let currency = coordinator.profile().currency.clone();

    match cli.command {
        Command::Login { .. } | Command::Logout => unreachable!("handled above"),
        Command::List {
            query,
            status,
            event_type,
            from,
            to,
        } => {
            let filter = ClientFilter {
                text_query: query,
                status: status.as_deref().map(parse_status).transpose()?,
                event_type,
                date_from: from,
                date_to: to,
            };
            let hits = coordinator.filtered_clients(&filter);
            for record in &hits {
                print_booking_line(record, &currency);
            }
            println!("{} booking(s) - {}", hits.len(), coordinator.indicator());
        }
        Command::AddClient {
            name,
            phone,
            event_type,
            event_date,
            total,
            package,
            location,
            email,
        } => {
            let mut record = ClientRecord::new(name, phone, event_type, event_date);
            record.total_price = total.unwrap_or(Decimal::ZERO);
            record.package = package;
            record.location = location;
            record.email = email;
            let id = record.id.clone();
            coordinator.save_client(record).await?;
            println!("booked {id} - {}", coordinator.indicator());
        }
        Command::AddItem {
            client_id,
            description,
            amount,
        } => {
            let mut record = find_client(&coordinator, &client_id)?;
            record.items.push(LineItem {
                id: uuid::Uuid::new_v4().to_string(),
                description,
                amount,
            });
            coordinator.save_client(record).await?;
            let record = find_client(&coordinator, &client_id)?;
            println!(
                "total {}{}, due {}{}",
                currency, record.total_price, currency, record.due_amount
            );
        }
        Command::AddPayment {
            client_id,
            amount,
            method,
            date,
        } => {
            let mut record = find_client(&coordinator, &client_id)?;
            record.payments.push(PaymentEntry {
                id: uuid::Uuid::new_v4().to_string(),
                date: date.unwrap_or_else(|| Utc::now().date_naive()),
                amount,
                method,
            });
            coordinator.save_client(record).await?;
            let record = find_client(&coordinator, &client_id)?;
            println!(
                "paid {}{}, due {}{}",
                currency, record.paid_amount, currency, record.due_amount
            );
        }
        Command::SetStatus { client_id, status } => {
            let mut record = find_client(&coordinator, &client_id)?;
            record.status = parse_status(&status)?;
            coordinator.save_client(record).await?;
            println!("status updated - {}", coordinator.indicator());
        }
        Command::DeleteClient { id } => {
            coordinator.delete_client(&id).await;
            println!("deleted {id} - {}", coordinator.indicator());
        }
        Command::Contacts => {
            for contact in coordinator.contacts() {
                println!("{:<24} {:<16} {}", contact.name, contact.phone, contact.id);
            }
            println!(
                "{} contact(s) - {}",
                coordinator.contacts().len(),
                coordinator.indicator()
            );
        }
        Command::AddContact {
            name,
            phone,
            email,
            address,
        } => {
            let mut contact = ContactRecord::new(name, phone);
            contact.email = email;
            contact.address = address;
            let id = contact.id.clone();
            coordinator.save_contact(contact).await?;
            println!("added {id} - {}", coordinator.indicator());
        }
        Command::DeleteContact { id } => {
            coordinator.delete_contact(&id).await;
            println!("deleted {id} - {}", coordinator.indicator());
        }
        Command::Stats => {
            let stats = coordinator.stats();
            println!("clients:          {}", stats.total_clients);
            println!("revenue:          {}{}", currency, stats.total_revenue);
            println!("pending payments: {}{}", currency, stats.pending_payments);
            println!("upcoming shoots:  {}", stats.upcoming_shoots);
            println!("mode:             {}", coordinator.indicator());
        }
        Command::Mode { value } => match value {
            None => println!(
                "{} - {}",
                coordinator.storage_mode().as_str(),
                coordinator.indicator()
            ),
            Some(raw) => {
                let mode = StorageMode::from_str_value(&raw).with_context(|| {
                    format!("unknown mode '{raw}'; expected local, relational or document_cloud")
                })?;
                coordinator.set_storage_mode(mode).await?;
                println!("storage mode set - {}", coordinator.indicator());
            }
        },
        Command::Resync => {
            coordinator.resync().await;
            println!("{}", coordinator.indicator());
        }
        Command::Export { format, out } => {
            let body = match format.as_str() {
                "json" => backup::export_json(coordinator.clients()),
                "sql" => backup::export_sql(coordinator.clients(), Utc::now()),
                other => bail!("unknown export format '{other}'; expected json or sql"),
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, body)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("exported to {}", path.display());
                }
                None => println!("{body}"),
            }
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let records = backup::import_json(&raw)?;
            let count = coordinator.import_clients(records).await?;
            println!("imported {count} booking(s) - {}", coordinator.indicator());
        }
        Command::Profile => {
            let profile = coordinator.profile();
            println!("name:     {}", profile.name);
            println!("address:  {}", profile.address);
            println!("phone:    {}", profile.phone);
            println!("email:    {}", profile.email);
            println!("website:  {}", profile.website);
            println!("currency: {}", profile.currency);
            println!("tax id:   {}", profile.tax_id);
        }
        Command::SetProfile {
            name,
            address,
            phone,
            email,
            website,
            currency,
            tax_id,
        } => {
            let mut profile = coordinator.profile().clone();
            if let Some(name) = name {
                profile.name = name;
            }
            if let Some(address) = address {
                profile.address = address;
            }
            if let Some(phone) = phone {
                profile.phone = phone;
            }
            if let Some(email) = email {
                profile.email = email;
            }
            if let Some(website) = website {
                profile.website = website;
            }
            if let Some(currency) = currency {
                profile.currency = currency;
            }
            if let Some(tax_id) = tax_id {
                profile.tax_id = tax_id;
            }
            coordinator.save_profile(profile).await;
            println!("profile saved - {}", coordinator.indicator());
        }
    }

    Ok(())
}
