//! Subcommand implementations.

use std::sync::Arc;

use anyhow::{bail, Context};
use staffdesk_admin::config::TOKEN_ENV;
use staffdesk_admin::render::{render_footer, render_options, render_record, render_table};
use staffdesk_admin::{
    AdminConfig, AdminError, FormController, FormMode, ListController, ReferenceOptions,
};
use staffdesk_client::stub::StubBackend;
use staffdesk_client::{ResourceApi, ResourceClient, SessionProvider, StaticSession};
use staffdesk_model::EntityKind;
use tracing::{debug, info};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::style;

const DEFAULT_BACKEND: &str = "http://localhost:3000";

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    init_logging(&config, cli.verbose)?;
    debug!(backend = %config.backend_url, page_size = config.page_size, "configuration loaded");

    match cli.command {
        Command::List {
            entity,
            page,
            page_size,
            search,
            sort,
        } => list(&config, &entity, page, page_size, search, &sort),
        Command::Get { entity, id } => {
            let client = client(&config, &entity)?;
            let record = client.get(id)?;
            print!("{}", render_record(client.schema(), &record));
            Ok(())
        }
        Command::Create { entity, set } => save(&config, &entity, None, &set),
        Command::Update { entity, id, set } => save(&config, &entity, Some(id), &set),
        Command::Delete { entity, id } => {
            let client = client(&config, &entity)?;
            client.delete(id)?;
            println!(
                "{}",
                style::success(format!("Deleted {} #{id}", client.schema().title))
            );
            Ok(())
        }
        Command::Options { entity, limit } => {
            let client = client(&config, &entity)?;
            let options = ReferenceOptions::load(&client, limit)?;
            print!("{}", render_options(&options));
            Ok(())
        }
        Command::Stub {
            listen,
            token,
            empty,
        } => stub(&listen, token.as_deref(), empty),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AdminConfig> {
    let mut config = if cli.config.is_file() {
        AdminConfig::load(&cli.config)?
    } else {
        AdminConfig::for_backend(cli.backend.as_deref().unwrap_or(DEFAULT_BACKEND))?
    };
    if let Some(url) = &cli.backend {
        config.backend_url = AdminConfig::for_backend(url)?.backend_url;
    }
    config.apply_env_token(std::env::var(TOKEN_ENV).ok());
    Ok(config)
}

fn init_logging(config: &AdminConfig, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let directive: Directive = level.parse().context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn client(config: &AdminConfig, entity: &str) -> anyhow::Result<ResourceClient> {
    let kind = EntityKind::parse(entity)?;
    let session: Arc<dyn SessionProvider> = match &config.access_token {
        Some(token) => Arc::new(StaticSession::new(token.clone())),
        None => Arc::new(StaticSession::anonymous()),
    };
    Ok(ResourceClient::with_options(
        &config.backend_url,
        kind.schema(),
        session,
        config.client_options(),
    ))
}

fn list(
    config: &AdminConfig,
    entity: &str,
    page: u32,
    page_size: Option<u32>,
    search: Option<String>,
    sort: &[String],
) -> anyhow::Result<()> {
    let client = client(config, entity)?;
    let page_size = page_size.unwrap_or(config.page_size).max(1);
    let mut list = ListController::new(client, page_size);
    // Only the refresh below runs; these tickets are superseded by it.
    if let Some(term) = search.as_deref() {
        let _ = list.set_search_deferred(term);
    }
    for column in sort {
        let _ = list.set_sort_deferred(column)?;
    }
    list.refresh()?;
    if page != 1 && !list.set_page(page)? {
        eprintln!(
            "{}",
            style::warning(format!(
                "Page {page} is out of range (1-{}); showing page {}",
                list.max_page(),
                list.query().page
            ))
        );
    }

    let schema = list.schema();
    print!("{}", style::heading(&render_table(schema, list.rows())));
    println!(
        "{}",
        style::accent(render_footer(
            list.query().page,
            page_size,
            list.total_count().unwrap_or(0)
        ))
    );
    Ok(())
}

fn save(
    config: &AdminConfig,
    entity: &str,
    id: Option<i64>,
    assignments: &[String],
) -> anyhow::Result<()> {
    let client = client(config, entity)?;
    let mut form = FormController::new(client);
    form.load(id)?;
    for assignment in assignments {
        let Some((field, value)) = assignment.split_once('=') else {
            bail!("expected FIELD=VALUE, got '{assignment}'");
        };
        form.set_input(field.trim(), value)?;
    }

    let submitted = match form.submit() {
        Ok(submitted) => submitted,
        Err(AdminError::Validation(errors)) => {
            for err in &errors {
                eprintln!("{}", style::error(format!("  {err}")));
            }
            bail!("{} field(s) failed validation; nothing was sent", errors.len());
        }
        Err(err) => return Err(err.into()),
    };
    let schema = form.schema();
    let verb = match form.mode() {
        FormMode::Create => "Created",
        FormMode::Edit(_) => "Updated",
    };
    let label = submitted
        .record
        .id()
        .map_or_else(|| schema.title.to_string(), |id| format!("{} #{id}", schema.title));
    info!(route = %submitted.navigate_to, "returning to list");
    println!("{}", style::success(format!("{verb} {label}")));
    print!("{}", render_record(schema, &submitted.record));
    Ok(())
}

fn stub(listen: &str, token: Option<&str>, empty: bool) -> anyhow::Result<()> {
    let backend = StubBackend::start(listen, token)
        .with_context(|| format!("failed to start stub backend on {listen}"))?;
    if !empty {
        backend.seed_demo();
    }
    println!(
        "{}",
        style::success(format!("Stub backend listening on {}", backend.base_url()))
    );
    if token.is_some() {
        println!(
            "{}",
            style::accent(format!("Requests must carry the token; export {TOKEN_ENV}=<token>"))
        );
    }
    backend.wait();
    Ok(())
}
