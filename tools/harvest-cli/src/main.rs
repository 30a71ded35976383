//! SynerHarvest command line client.
//!
//! Talks to the same REST API as the web app. The session (token and user)
//! is kept in a JSON file under the user config directory.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use harvest_client::auth::LOGIN_FAILED;
use harvest_client::session::{RegistrationOutcome, LANDING_ROUTE};
use harvest_client::storage::FileStore;
use harvest_client::tracking::{batch_not_found, lookup_scanned_batch, JOURNEY_NOT_FOUND};
use harvest_client::weather::WeatherService;
use harvest_client::{ApiClient, ClientConfig, ClientError, Session};
use harvest_common::actions::{actions_for_role, plan_submission, ActionForm, ActionSubmission, RoleAction};
use harvest_common::analytics::Count;
use harvest_common::batch::{Batch, BatchDraft, BatchEvent};
use harvest_common::lifecycle::event_type_label;
use harvest_common::location::GeoLocation;
use harvest_common::navigation::batch_quick_links;
use harvest_common::product::{ProductPageQuery, ProductType};
use harvest_common::qr;
use harvest_common::registration::RegistrationForm;
use harvest_common::role::UserRole;
use harvest_common::tracking::tracking_url;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "harvest", about = "SynerHarvest supply-chain client")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "HARVEST_API_URL")]
    api_url: Option<String>,

    /// Session file (default: <config dir>/synerharvest/session.json).
    #[arg(long, env = "HARVEST_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and keep the session.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "HARVEST_PASSWORD")]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user and what they can do.
    Whoami,
    /// Create an account (or park it for approval, per HARVEST_REGISTRATION_MODE).
    Register(RegisterArgs),
    #[command(subcommand)]
    Products(ProductsCmd),
    #[command(subcommand)]
    Batches(BatchesCmd),
    /// Record an event against a batch.
    Event {
        batch_id: i64,
        #[arg(long = "type")]
        event_type: String,
        #[command(flatten)]
        readings: Readings,
    },
    /// Change a batch's status; the status follows from the event type.
    Status {
        batch_id: i64,
        #[arg(long = "type")]
        event_type: String,
        #[command(flatten)]
        readings: Readings,
    },
    /// Look up a scanned code or tracking URL (signed in).
    Scan { payload: String },
    /// Public journey of a batch.
    Track { payload: String },
    /// Write a batch's tracking QR code as SVG.
    Qr {
        batch_code: String,
        #[arg(long, default_value_t = 256)]
        size: u32,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Dashboard figures.
    Analytics,
    /// Weather for coordinates, a place, or the signed-in user's farm.
    Weather {
        /// "lat,lon"
        #[arg(long, conflicts_with = "place")]
        coords: Option<String>,
        #[arg(long)]
        place: Option<String>,
    },
}

#[derive(clap::Args)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "HARVEST_PASSWORD")]
    password: String,
    #[arg(long)]
    confirm_password: Option<String>,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long, default_value = "FARMER")]
    role: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    coordinates: Option<String>,
}

#[derive(clap::Args)]
struct Readings {
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    temperature: Option<String>,
    #[arg(long)]
    humidity: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl Readings {
    fn into_form(self, event_type: String) -> ActionForm {
        ActionForm {
            event_type,
            location: self.location.unwrap_or_default(),
            temperature: self.temperature.unwrap_or_default(),
            humidity: self.humidity.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum ProductsCmd {
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
        #[arg(long)]
        search: Option<String>,
    },
    Show { id: i64 },
    Search { keyword: String },
    ByType { product_type: String },
    Organic,
    Expiring {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum BatchesCmd {
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        product: Option<i64>,
    },
    Show { id: i64 },
    Events { id: i64 },
    Create {
        #[arg(long)]
        product_id: i64,
        #[arg(long)]
        quantity: u32,
        /// YYYY-MM-DD, default today.
        #[arg(long)]
        production_date: Option<NaiveDate>,
        #[arg(long)]
        expiration_date: Option<NaiveDate>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Expiring {
        #[arg(long, default_value_t = harvest_client::batches::DEFAULT_EXPIRING_DAYS)]
        days: u32,
    },
}

// ─── Output ─────────────────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_batches(batches: &[Batch]) {
    for b in batches {
        println!(
            "{:>6}  {:<20}  {:<16}  {:>6}  {}",
            b.id.map(|i| i.to_string()).unwrap_or_default(),
            b.code(),
            b.status_str(),
            b.quantity,
            b.product_name.as_deref().unwrap_or_default()
        );
    }
}

fn print_events(events: &[BatchEvent]) {
    for e in events {
        let when = e
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        let tx = e.short_tx_hash().map(|h| format!("  tx {h}")).unwrap_or_default();
        println!(
            "{when}  {:<18}  {}{tx}",
            event_type_label(&e.event_type),
            e.location.as_deref().unwrap_or_default()
        );
    }
}

fn print_counts(title: &str, counts: &[Count]) {
    println!("{title}:");
    for c in counts {
        println!("  {:<16} {}", c.key, c.count);
    }
}

// ─── Session ────────────────────────────────────────────────────────────────

fn open_session(cli: &Cli, config: &ClientConfig) -> Result<Session<FileStore>> {
    let store = match &cli.session_file {
        Some(path) => FileStore::new(path),
        None => FileStore::default_location().context("no config directory for the session file")?,
    };
    debug!(path = %store.path().display(), "session file");
    let session = Session::new(ApiClient::new(&config.api_base_url), store, config.registration_mode);
    session.restore().context("reading stored session")?;
    Ok(session)
}

fn require_login(session: &Session<FileStore>) -> Result<()> {
    if session.is_authenticated() {
        Ok(())
    } else {
        bail!("not signed in; run `harvest login` first")
    }
}

fn shown(err: ClientError, fallback: &str) -> anyhow::Error {
    anyhow!(err.user_message(fallback))
}

// ─── Commands ───────────────────────────────────────────────────────────────

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    let session = open_session(&cli, &config)?;
    let api = session.api().clone();
    let json = cli.json;

    match cli.command {
        Command::Login { username, password } => {
            let user = session
                .login(&username, &password)
                .await
                .map_err(|e| shown(e, LOGIN_FAILED))?;
            println!("Signed in as {} ({}). Next: {LANDING_ROUTE}", user.display_name(), user.role);
        }
        Command::Logout => {
            session.logout()?;
            println!("Signed out.");
        }
        Command::Whoami => {
            let Some(user) = session.init().await? else {
                bail!("not signed in");
            };
            if json {
                return print_json(&user);
            }
            println!("{} <{}> {}", user.display_name(), user.email, user.role);
            for a in actions_for_role(user.role()) {
                println!("  - {}", a.label);
            }
        }
        Command::Register(args) => register(&session, args).await?,
        Command::Products(cmd) => {
            require_login(&session)?;
            products(&api, cmd, json).await?;
        }
        Command::Batches(cmd) => {
            require_login(&session)?;
            batches(&api, cmd, json).await?;
        }
        Command::Event {
            batch_id,
            event_type,
            readings,
        } => {
            require_login(&session)?;
            let form = readings.into_form(event_type);
            submit(&api, RoleAction::CreateEvent, batch_id, &form).await?;
        }
        Command::Status {
            batch_id,
            event_type,
            readings,
        } => {
            require_login(&session)?;
            let form = readings.into_form(event_type);
            submit(&api, RoleAction::UpdateStatus, batch_id, &form).await?;
        }
        Command::Scan { payload } => {
            require_login(&session)?;
            let batch = lookup_scanned_batch(&api, &payload)
                .await
                .map_err(|e| shown(e, &batch_not_found(payload.trim())))?;
            if json {
                return print_json(&batch);
            }
            print_batches(std::slice::from_ref(&batch));
            let role = session.user().and_then(|u| u.role());
            if let Some(id) = batch.id {
                for link in batch_quick_links(role, id, batch.code()) {
                    println!("  {:<18} {}", link.label, link.path);
                }
            }
        }
        Command::Track { payload } => {
            let journey = api
                .tracking()
                .journey_for_scan(&payload)
                .await
                .map_err(|e| shown(e, JOURNEY_NOT_FOUND))?;
            if json {
                return print_json(&journey);
            }
            let b = &journey.batch;
            let status = b.status().map(|s| s.label()).unwrap_or(b.status_str());
            println!(
                "{} [{status}] {}",
                b.code(),
                b.product_name.as_deref().unwrap_or_default()
            );
            if let Some(p) = &journey.product {
                println!("{} ({}{})", p.name, p.type_key(), if p.organic { ", organic" } else { "" });
            }
            println!("Quality checks: {}", journey.quality_check_count());
            let timeline: Vec<BatchEvent> = journey.timeline().into_iter().cloned().collect();
            print_events(&timeline);
        }
        Command::Qr {
            batch_code,
            size,
            out,
        } => {
            let url = tracking_url(&config.tracking_base_url, &batch_code);
            let svg = qr::render_svg(&url, size)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, svg).with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {} for {url}", path.display());
                }
                None => println!("{svg}"),
            }
        }
        Command::Analytics => {
            require_login(&session)?;
            let analytics = api.analytics();
            let (summary, statuses, types, months) = tokio::join!(
                analytics.summary(),
                analytics.batch_status_distribution(),
                analytics.product_type_distribution(),
                analytics.monthly_production(),
            );
            if json {
                return print_json(&serde_json::json!({
                    "summary": summary,
                    "batchStatus": statuses,
                    "productTypes": types,
                    "monthlyProduction": months,
                }));
            }
            println!(
                "Products {}  Batches {}  In transit {}  Expiring {}",
                summary.total_products,
                summary.total_batches,
                summary.active_shipments,
                summary.expiring_batches
            );
            print_counts("Batch status", &statuses);
            print_counts("Product types", &types);
            print_counts("Monthly production", &months);
        }
        Command::Weather { coords, place } => {
            let weather = WeatherService::new(&config);
            let data = match (coords, place) {
                (Some(c), _) => {
                    let at = GeoLocation::parse(&c).ok_or_else(|| anyhow!("invalid coordinates: {c}"))?;
                    weather.by_coordinates(at).await
                }
                (None, Some(p)) => weather.by_location(&p).await,
                (None, None) => {
                    let user = session.init().await?.context("sign in or pass --coords/--place")?;
                    let at = user
                        .location()
                        .context("profile has no usable coordinates; pass --coords or --place")?;
                    weather.by_coordinates(at).await
                }
            }
            .map_err(|e| shown(e, "Failed to fetch weather data"))?;
            if json {
                return print_json(&data);
            }
            let c = &data.current;
            println!(
                "{}: {}°C, {} ({}), humidity {}%, wind {} m/s",
                c.location, c.temperature, c.condition, c.condition_description, c.humidity, c.wind_speed
            );
            for d in &data.forecast {
                println!("  {} {:<6} {:>5}°C  {}", d.day_label(), d.date_label(), d.temp, d.condition);
            }
        }
    }
    Ok(())
}

async fn register(session: &Session<FileStore>, args: RegisterArgs) -> Result<()> {
    let role: UserRole = args.role.parse().map_err(|e| anyhow!("{e}"))?;
    let form = RegistrationForm {
        confirm_password: args.confirm_password.unwrap_or_else(|| args.password.clone()),
        username: args.username,
        email: args.email,
        password: args.password,
        first_name: args.first_name,
        last_name: args.last_name,
        role: Some(role),
        phone_number: args.phone.unwrap_or_default(),
        company_name: args.company.unwrap_or_default(),
        company_address: args.address.unwrap_or_default(),
        location_coordinates: args
            .coordinates
            .unwrap_or_else(|| harvest_common::registration::DEFAULT_LOCATION_COORDINATES.into()),
    };
    let request = form.into_request().map_err(|errors| {
        let lines: Vec<String> = errors.iter().map(|(f, m)| format!("{f}: {m}")).collect();
        anyhow!(lines.join("\n"))
    })?;
    let outcome = session
        .register(request, Local::now().naive_local())
        .await
        .map_err(|e| {
            if let Some(fields) = e.field_errors() {
                for (f, m) in fields {
                    eprintln!("{f}: {m}");
                }
            }
            shown(e, harvest_client::auth::REGISTRATION_FAILED)
        })?;
    match outcome {
        RegistrationOutcome::Registered => println!("Registered. Sign in with `harvest login`."),
        RegistrationOutcome::PendingApproval { message } => println!("{message}"),
    }
    Ok(())
}

async fn products(api: &ApiClient, cmd: ProductsCmd, json: bool) -> Result<()> {
    let svc = api.products();
    let list = match cmd {
        ProductsCmd::List { page, size, search } => {
            let query = ProductPageQuery {
                page,
                size,
                search,
                ..Default::default()
            };
            let page = svc.paged(&query).await?;
            if json {
                return print_json(&page);
            }
            println!("page {} of {} ({} products)", page.number + 1, page.total_pages.max(1), page.total_elements);
            page.content
        }
        ProductsCmd::Show { id } => {
            let p = svc.get(id).await.with_context(|| format!("product {id}"))?;
            return print_json(&p);
        }
        ProductsCmd::Search { keyword } => svc.search(&keyword).await?,
        ProductsCmd::ByType { product_type } => svc.by_type(ProductType::from_value(&product_type)).await?,
        ProductsCmd::Organic => svc.organic().await?,
        ProductsCmd::Expiring { days } => svc.expiring(days).await?,
        ProductsCmd::Delete { id } => {
            svc.delete(id).await.with_context(|| format!("deleting product {id}"))?;
            println!("Deleted product {id}.");
            return Ok(());
        }
    };
    if json {
        return print_json(&list);
    }
    for p in &list {
        println!(
            "{:>6}  {:<24}  {:<10}  {:>8.2}  {}",
            p.id.map(|i| i.to_string()).unwrap_or_default(),
            p.name,
            p.type_label(),
            p.price,
            if p.organic { "organic" } else { "" }
        );
    }
    Ok(())
}

async fn batches(api: &ApiClient, cmd: BatchesCmd, json: bool) -> Result<()> {
    let svc = api.batches();
    let list = match cmd {
        BatchesCmd::List { status, product } => match (status, product) {
            (Some(s), _) => svc.by_status(&s.to_ascii_uppercase()).await?,
            (None, Some(p)) => svc.by_product(p).await?,
            (None, None) => svc.mine().await?,
        },
        BatchesCmd::Show { id } => {
            let b = svc.get(id).await.with_context(|| format!("batch {id}"))?;
            return print_json(&b);
        }
        BatchesCmd::Events { id } => {
            let events = svc.events(id).await?;
            if json {
                return print_json(&events);
            }
            print_events(&events);
            return Ok(());
        }
        BatchesCmd::Create {
            product_id,
            quantity,
            production_date,
            expiration_date,
            code,
            notes,
        } => {
            let product = api.products().get(product_id).await.ok();
            let draft = BatchDraft {
                product_id: Some(product_id),
                product_name: product.map(|p| p.name),
                batch_code: code.unwrap_or_default(),
                quantity,
                production_date: Some(production_date.unwrap_or_else(|| Local::now().date_naive())),
                expiration_date,
                notes: notes.unwrap_or_default(),
            };
            let batch = draft.into_batch().map_err(|e| anyhow!(e))?;
            let created = svc.create(&batch).await?;
            println!("Created batch {}", created.code());
            return Ok(());
        }
        BatchesCmd::Expiring { days } => svc.expiring(days).await?,
    };
    if json {
        return print_json(&list);
    }
    print_batches(&list);
    Ok(())
}

async fn submit(api: &ApiClient, action: RoleAction, batch_id: i64, form: &ActionForm) -> Result<()> {
    let current = api.batches().get(batch_id).await?;
    let plan = plan_submission(action, Some(batch_id), current.status_str(), form).map_err(|e| anyhow!(e))?;
    match plan {
        ActionSubmission::UpdateStatus {
            batch_id,
            status,
            event,
        } => {
            let batch = api.batches().update_status(batch_id, &status, &event).await?;
            println!("Batch {} is now {}", batch.code(), batch.status_str());
        }
        ActionSubmission::AddEvent { batch_id, event } => {
            api.batches().add_event(batch_id, &event).await?;
            println!("Recorded {} on batch {batch_id}", event_type_label(&event.event_type));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
