use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use gleaner::api::{AppState, create_router};
use gleaner::catalog::load_catalog;
use gleaner::config::Config;
use gleaner::data_models::{Article, SearchCriteria};
use gleaner::query_engine::search_items;
use gleaner::report::summarize_items;
use gleaner::summarizer::{BatchSummarizer, OpenAiModel};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Search an article catalog and summarize the matches",
    long_about = None
)]
struct Cli {
    /// Catalog JSON file (overrides CATALOG_PATH)
    #[arg(long, global = true)]
    catalog: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Search once from the terminal; prompts for anything not given
    Search {
        query: Option<String>,
        /// Restrict matching to one field (e.g. title, topics, keywords)
        #[arg(long)]
        field: Option<String>,
        /// Maximum number of matches to summarize
        #[arg(long)]
        max_items: Option<usize>,
        /// Items per summarization call
        #[arg(long)]
        batch_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(catalog) = cli.catalog.clone() {
        config.catalog_path = catalog;
    }

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            serve(config).await
        }
        Commands::Search {
            query,
            field,
            max_items,
            batch_size,
        } => {
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            let explicit_catalog = cli.catalog.is_some();
            run_search(config, explicit_catalog, query, field, max_items).await
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let model = OpenAiModel::new(&config)?;
    let summarizer = BatchSummarizer::new(Arc::new(model), config.batch_size);
    let state = Arc::new(AppState::new(config.catalog_path.clone(), summarizer));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_search(
    config: Config,
    explicit_catalog: bool,
    query: Option<String>,
    field: Option<String>,
    max_items: Option<usize>,
) -> anyhow::Result<()> {
    config.require_api_key()?;
    println!("--- Agente de Búsqueda y Resumen con IA ---");

    let catalog = match resolve_catalog(&config, explicit_catalog)? {
        Some(catalog) => catalog,
        None => {
            println!("No se especificó un archivo JSON. Saliendo.");
            return Ok(());
        }
    };

    let interactive = query.is_none();
    let query = match query {
        Some(q) => q,
        None => prompt("Criterio de búsqueda (ej: microgravity, bone, space medicine): ")?,
    };
    if query.is_empty() {
        println!("El criterio de búsqueda no puede estar vacío.");
        return Ok(());
    }

    let (field, max_items) = if interactive {
        let field = prompt(
            "Campo de filtro (opcional, ej: title, topics, keywords. Enter para omitir): ",
        )?;
        let max_items = prompt("Máximo de ítems a mostrar (opcional, por defecto 5): ")?;
        (
            Some(field).filter(|f| !f.is_empty()),
            max_items.parse::<usize>().unwrap_or(config.max_items),
        )
    } else {
        (field, max_items.unwrap_or(config.max_items))
    };

    let outcome = search_items(&catalog, &query, field.as_deref());
    if let Some(note) = &outcome.note {
        tracing::warn!("{}", note);
        println!("\nAviso: {note}\n");
    }

    if outcome.matches.is_empty() {
        println!("\nNo se encontraron coincidencias. Aquí tienes algunas sugerencias:");
        println!("1. Usa una palabra clave diferente o más general (en inglés).");
        println!("2. Revisa la ortografía.");
        println!("3. Omite el 'campo_filtro' para una búsqueda más amplia.");
        return Ok(());
    }

    let model = OpenAiModel::new(&config)?;
    let summarizer = BatchSummarizer::new(Arc::new(model), config.batch_size);
    let criteria = SearchCriteria {
        query,
        field: outcome.effective_field.clone(),
    };
    let report = summarize_items(&outcome.matches, max_items, &criteria, &summarizer).await;

    println!("\n{} SALIDA LEGIBLE {}", "=".repeat(20), "=".repeat(20));
    println!("{}", report.text);
    println!("\n{} SALIDA JSON {}", "=".repeat(20), "=".repeat(20));
    println!("{}", serde_json::to_string_pretty(&report.structured_json())?);
    Ok(())
}

/// Load the configured catalog; if it is the default and missing or unusable,
/// ask for a path instead. `None` means the user gave no path.
fn resolve_catalog(config: &Config, explicit: bool) -> anyhow::Result<Option<Vec<Article>>> {
    if explicit {
        return Ok(Some(load_catalog(&config.catalog_path)?));
    }

    if Path::new(&config.catalog_path).is_file() {
        println!("Usando el archivo '{}' encontrado.", config.catalog_path);
        match load_catalog(&config.catalog_path) {
            Ok(catalog) => return Ok(Some(catalog)),
            Err(e) => {
                tracing::warn!("could not load {}: {}", config.catalog_path, e);
                println!("Advertencia: No se pudo cargar '{}'. {}", config.catalog_path, e);
            }
        }
    }

    let path = prompt("Introduce la ruta al archivo JSON de artículos: ")?;
    if path.is_empty() {
        return Ok(None);
    }
    Ok(Some(load_catalog(&path)?))
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
