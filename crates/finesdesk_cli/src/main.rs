//! Command-line front end for the FinesDesk client layer.

mod forms;
mod render;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use finesdesk_client::{
    load_dashboard, AbsencesPage, Backend, HttpBackend, ListView, ManagePage, Managed,
    MyRecordsPage,
};
use finesdesk_core::models::{Admin, Event, Fine, Page, Role, Secretary, Session, Student};
use finesdesk_core::{AppError, Config, Filter, InvalidationBus, Record};
use finesdesk_server::seed::DEMO_SEED;
use finesdesk_server::EmbeddedServer;
use render::TableRow;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "fdesk", about = "FinesDesk attendance and fines CLI", version)]
struct Cli {
    /// Server URL (can also be set via FINESDESK_SERVER env var)
    #[arg(short, long, env = "FINESDESK_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Session role (admin, secretary, student)
    #[arg(short, long, global = true, value_parser = parse_role)]
    role: Option<Role>,

    /// Student ID for the student role
    #[arg(long, global = true)]
    student_id: Option<String>,

    /// Run against an embedded server seeded with demo data
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show one page of a list
    List {
        #[arg(value_enum)]
        resource: ListResource,
        #[command(flatten)]
        view: ViewArgs,
        /// Category filter (year level, month or status)
        #[arg(short, long, default_value = "All")]
        filter: String,
    },
    /// Create a record
    Add {
        #[arg(value_enum)]
        resource: ManagedResource,
        /// Form field, e.g. --set email=ana@school.edu
        #[arg(
            long = "set",
            value_name = "FIELD=VALUE",
            value_parser = forms::parse_field
        )]
        fields: Vec<(String, String)>,
    },
    /// Edit a record
    Update {
        #[arg(value_enum)]
        resource: ManagedResource,
        id: u64,
        #[arg(
            long = "set",
            value_name = "FIELD=VALUE",
            value_parser = forms::parse_field
        )]
        fields: Vec<(String, String)>,
    },
    /// Delete a record
    Delete {
        #[arg(value_enum)]
        resource: ManagedResource,
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Mark a fine as paid
    Pay { id: u64 },
    /// Totals and charts
    Dashboard,
    /// Your own fines or absences (student role)
    Mine {
        #[arg(value_enum, default_value = "fines")]
        kind: MineKind,
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
struct ViewArgs {
    /// Search text
    #[arg(short = 'q', long, default_value = "")]
    search: String,
    /// Page number
    #[arg(short, long, default_value = "1")]
    page: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ListResource {
    Students,
    Admins,
    Secretaries,
    Events,
    Fines,
    Absences,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ManagedResource {
    Students,
    Admins,
    Secretaries,
    Events,
    Fines,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum MineKind {
    Fines,
    Absences,
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse()
}

fn log_timing(timing: bool, label: &str, duration: Duration) {
    if timing {
        eprintln!(
            "[timing] {}: {:.1} ms",
            label,
            duration.as_secs_f64() * 1000.0
        );
    }
}

/// Everything a command needs to talk to the backend.
struct Context {
    backend: HttpBackend,
    session: Session,
    bus: InvalidationBus,
    json: bool,
}

impl Context {
    fn done(&self, message: Option<String>, fallback: &str) -> anyhow::Result<String> {
        let message = message.unwrap_or_else(|| fallback.to_string());
        if self.json {
            return Ok(serde_json::to_string_pretty(
                &serde_json::json!({ "success": true, "message": message }),
            )?);
        }
        Ok(message)
    }
}

/// Apply search, filter and page to a refreshed view and render it.
fn show_list<R, B>(
    view: &mut ListView<R, B>,
    title: &str,
    args: &ViewArgs,
    filter: Filter,
    json: bool,
) -> anyhow::Result<String>
where
    R: Record + TableRow,
    B: Backend,
{
    view.set_search(args.search.clone());
    view.set_filter(filter);
    view.jump_to(args.page);
    let rows = view.page_rows();
    let pager = view.pager();
    if json {
        return Ok(render::list_page_json(&rows, &pager)?);
    }
    Ok(render::list_page(title, &rows, &pager))
}

async fn list_managed<R: Managed + TableRow>(
    ctx: &Context,
    args: &ViewArgs,
    filter: Filter,
) -> anyhow::Result<String> {
    let page = ManagePage::<R, _>::open(&ctx.session, ctx.backend.clone(), &ctx.bus)?;
    let mut view = page.list;
    view.refresh().await?;
    show_list(&mut view, R::PAGE.title(), args, filter, ctx.json)
}

async fn list_absences(ctx: &Context, args: &ViewArgs, filter: Filter) -> anyhow::Result<String> {
    let mut page = AbsencesPage::open(&ctx.session, ctx.backend.clone(), &ctx.bus)?;
    page.list.refresh().await?;
    show_list(
        &mut page.list,
        Page::Absences.title(),
        args,
        filter,
        ctx.json,
    )
}

async fn add<R: Managed>(ctx: &Context, fields: &[(String, String)]) -> anyhow::Result<String> {
    let mut page = ManagePage::<R, _>::open(&ctx.session, ctx.backend.clone(), &ctx.bus)?;
    page.create.open_create();
    let form = forms::apply(page.create.modal().form(), fields)?;
    *page.create.form_mut() = form;
    let message = page.create.submit().await?;
    ctx.done(message, "Saved.")
}

/// Load the list and find the record a command targets.
async fn find<R: Managed>(page: &mut ManagePage<R, HttpBackend>, id: u64) -> anyhow::Result<R> {
    page.list.refresh().await?;
    let wanted = id.to_string();
    page.list
        .records()
        .iter()
        .find(|record| record.record_id() == wanted)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No {} with id {}.", R::RESOURCE.singular(), id))
}

async fn update<R: Managed>(
    ctx: &Context,
    id: u64,
    fields: &[(String, String)],
) -> anyhow::Result<String> {
    let mut page = ManagePage::<R, _>::open(&ctx.session, ctx.backend.clone(), &ctx.bus)?;
    let record = find(&mut page, id).await?;
    page.open_edit(&record);
    let form = forms::apply(page.edit.modal().form(), fields)?;
    *page.edit.form_mut() = form;
    let message = page.edit.submit().await?;
    ctx.done(message, "Saved.")
}

fn confirm(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

async fn delete<R: Managed>(ctx: &Context, id: u64, yes: bool) -> anyhow::Result<String> {
    let mut page = ManagePage::<R, _>::open(&ctx.session, ctx.backend.clone(), &ctx.bus)?;
    let record = find(&mut page, id).await?;
    if !yes {
        let prompt = format!("Delete {} {}?", R::RESOURCE.singular(), id);
        if !confirm(&prompt, &mut io::stdin().lock(), &mut io::stderr())? {
            return Ok("Cancelled.".to_string());
        }
    }
    let message = page.delete(&record).await?;
    ctx.done(message, "Deleted.")
}

async fn pay(ctx: &Context, id: u64) -> anyhow::Result<String> {
    let mut page = ManagePage::<Fine, _>::open(&ctx.session, ctx.backend.clone(), &ctx.bus)?;
    let fine = find(&mut page, id).await?;
    let message = page.pay(&fine).await?;
    ctx.done(message, "Fine marked as paid.")
}

async fn dashboard(ctx: &Context) -> anyhow::Result<String> {
    let stats = load_dashboard(&ctx.session, &ctx.backend).await?;
    if ctx.json {
        return Ok(serde_json::to_string_pretty(&stats)?);
    }
    Ok(render::dashboard(&stats))
}

async fn mine(ctx: &Context, kind: MineKind, args: &ViewArgs) -> anyhow::Result<String> {
    let mut page = MyRecordsPage::open(&ctx.session, ctx.backend.clone(), &ctx.bus)?;
    page.refresh().await?;
    let title = Page::MyRecords.title();
    match kind {
        MineKind::Fines => show_list(&mut page.fines, title, args, Filter::All, ctx.json),
        MineKind::Absences => show_list(&mut page.absences, title, args, Filter::All, ctx.json),
    }
}

async fn dispatch(ctx: &Context, command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::Completions { .. } => Ok(String::new()),
        Commands::List {
            resource,
            view,
            filter,
        } => {
            let filter = Filter::parse(&filter);
            match resource {
                ListResource::Students => list_managed::<Student>(ctx, &view, filter).await,
                ListResource::Admins => list_managed::<Admin>(ctx, &view, filter).await,
                ListResource::Secretaries => list_managed::<Secretary>(ctx, &view, filter).await,
                ListResource::Events => list_managed::<Event>(ctx, &view, filter).await,
                ListResource::Fines => list_managed::<Fine>(ctx, &view, filter).await,
                ListResource::Absences => list_absences(ctx, &view, filter).await,
            }
        }
        Commands::Add { resource, fields } => match resource {
            ManagedResource::Students => add::<Student>(ctx, &fields).await,
            ManagedResource::Admins => add::<Admin>(ctx, &fields).await,
            ManagedResource::Secretaries => add::<Secretary>(ctx, &fields).await,
            ManagedResource::Events => add::<Event>(ctx, &fields).await,
            ManagedResource::Fines => add::<Fine>(ctx, &fields).await,
        },
        Commands::Update {
            resource,
            id,
            fields,
        } => match resource {
            ManagedResource::Students => update::<Student>(ctx, id, &fields).await,
            ManagedResource::Admins => update::<Admin>(ctx, id, &fields).await,
            ManagedResource::Secretaries => update::<Secretary>(ctx, id, &fields).await,
            ManagedResource::Events => update::<Event>(ctx, id, &fields).await,
            ManagedResource::Fines => update::<Fine>(ctx, id, &fields).await,
        },
        Commands::Delete { resource, id, yes } => match resource {
            ManagedResource::Students => delete::<Student>(ctx, id, yes).await,
            ManagedResource::Admins => delete::<Admin>(ctx, id, yes).await,
            ManagedResource::Secretaries => delete::<Secretary>(ctx, id, yes).await,
            ManagedResource::Events => delete::<Event>(ctx, id, yes).await,
            ManagedResource::Fines => delete::<Fine>(ctx, id, yes).await,
        },
        Commands::Pay { id } => pay(ctx, id).await,
        Commands::Dashboard => dashboard(ctx).await,
        Commands::Mine { kind, view } => mine(ctx, kind, &view).await,
    }
}

fn command_label(command: &Commands) -> &'static str {
    match command {
        Commands::Completions { .. } => "completions",
        Commands::List { .. } => "list",
        Commands::Add { .. } => "add",
        Commands::Update { .. } => "update",
        Commands::Delete { .. } => "delete",
        Commands::Pay { .. } => "pay",
        Commands::Dashboard => "dashboard",
        Commands::Mine { .. } => "mine",
    }
}

/// Config from the environment with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(role) = cli.role {
        config.session_role = role;
    }
    if let Some(student_id) = &cli.student_id {
        config.session_student_id = Some(student_id.clone());
    }
    config
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let config = resolve_config(&cli);
    let demo = if cli.demo {
        Some(EmbeddedServer::demo(DEMO_SEED)?)
    } else {
        None
    };
    let server = demo
        .as_ref()
        .map(EmbeddedServer::url)
        .unwrap_or_else(|| config.server_url.clone());
    tracing::debug!(server = %server, role = %config.session_role.as_str(), "resolved session");

    let ctx = Context {
        backend: HttpBackend::new(&server, Duration::from_secs(config.request_timeout_secs))?,
        session: config.session(),
        bus: InvalidationBus::new(),
        json: cli.json,
    };
    let label = command_label(&cli.command);
    let started = Instant::now();
    let output = dispatch(&ctx, cli.command).await;
    log_timing(cli.timing, label, started.elapsed());
    output
}

fn error_text(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AppError>() {
        Some(app) => render::error(app),
        None => format!("Error: {}", err),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "fdesk", &mut io::stdout());
        return;
    }

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(err) => {
            eprintln!("{}", error_text(&err));
            std::process::exit(1);
        }
    }
}
