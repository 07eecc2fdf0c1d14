use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use indicatif::{ProgressBar, ProgressStyle};
use ratatui::{Terminal, backend::CrosstermBackend};

use deezer_discover::{
    Browser, Config, ExternalPlayer, PlaybackController, PlaybackState, ProxyClient, ProxyState,
    RodioBackend, SearchController, SearchState, TrackListView, create_router,
    browser::spawn_input_reader,
    deezer::client::DEFAULT_BACKEND_URL,
    logging::{setup_file_tracing, setup_tracing},
    playback::AudioBackend,
    search::{DEFAULT_QUERY, SearchPhase},
};

#[derive(Parser)]
#[command(name = "deezer-discover")]
#[command(about = "Search Deezer and play 30-second track previews")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the credential-injecting proxy server
    Serve {
        /// Address to bind (defaults to 0.0.0.0 on PORT)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Search and play previews in the terminal
    Browse {
        /// Proxy server URL (or set DEEZER_PROXY_URL env var)
        #[arg(long, env = "DEEZER_PROXY_URL", default_value = DEFAULT_BACKEND_URL)]
        backend_url: String,

        /// External command to play preview URLs instead of the built-in
        /// audio output (or set PREVIEW_PLAYER env var)
        #[arg(long, env = "PREVIEW_PLAYER")]
        player: Option<String>,
    },

    /// Run a single search and print the results
    Search {
        /// Search text (defaults to popular tracks)
        query: Option<String>,

        /// Proxy server URL (or set DEEZER_PROXY_URL env var)
        #[arg(long, env = "DEEZER_PROXY_URL", default_value = DEFAULT_BACKEND_URL)]
        backend_url: String,
    },

    /// Show setup guide
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            setup_tracing(cli.verbose);
            serve(bind).await?;
        }
        Commands::Browse {
            backend_url,
            player,
        } => {
            let _guard = setup_file_tracing(cli.verbose).context("Failed to initialize logging")?;
            browse(&backend_url, player.as_deref()).await?;
        }
        Commands::Search { query, backend_url } => {
            setup_tracing(cli.verbose);
            search_once(query.as_deref().unwrap_or_default(), &backend_url).await?;
        }
        Commands::Setup => {
            show_setup_guide();
        }
    }

    Ok(())
}

async fn serve(bind: Option<SocketAddr>) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let missing = config.get_missing_config();
    if !missing.is_empty() {
        println!("{}", "FATAL ERROR: missing configuration:".red());
        for item in &missing {
            println!("   - {}", item);
        }
        println!(
            "\n{}",
            "Set RAPIDAPI_KEY in your environment or .env file and restart the server.".yellow()
        );
        std::process::exit(1);
    }

    let state = ProxyState::new(&config).context("Failed to initialize proxy")?;

    tracing::info!("Backend starting with RAPIDAPI_HOST: {}", config.rapidapi_host);
    tracing::info!("Backend starting with RAPIDAPI_KEY: {}", config.key_preview());

    let addr = bind.unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], config.port)));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Backend proxy server running on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn browse(backend_url: &str, player: Option<&str>) -> Result<()> {
    let client = ProxyClient::new(backend_url).context("Invalid backend URL")?;

    match player {
        Some(command) => {
            let player = ExternalPlayer::new(command).context("Invalid player command")?;
            tracing::info!(
                "Starting browser against {} with player {}",
                client.base_url(),
                player.program()
            );
            run_browser(client, player).await
        }
        None => {
            tracing::info!(
                "Starting browser against {} with built-in audio",
                client.base_url()
            );
            run_browser(client, RodioBackend::new()).await
        }
    }
}

async fn run_browser<B: AudioBackend>(client: ProxyClient, backend: B) -> Result<()> {
    let browser = Browser::new(SearchController::new(client), PlaybackController::new(backend));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = browser.run(&mut terminal, spawn_input_reader()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = %err, "Browser failed");
    }

    res.context("Browser failed")
}

async fn search_once(query: &str, backend_url: &str) -> Result<()> {
    let client = ProxyClient::new(backend_url).context("Invalid backend URL")?;
    let effective = if query.is_empty() { DEFAULT_QUERY } else { query };

    println!("{}", format!("Searching for '{}'", effective).cyan().bold());
    println!("{}", "=".repeat(50));

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Querying {}", client.base_url()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = client.search_tracks(effective).await;
    pb.finish_and_clear();

    let tracks = match result {
        Ok(tracks) => tracks,
        Err(e) => {
            tracing::debug!("Search failed: {}", e);
            println!("{}", "Failed to fetch tracks.".red());
            println!("   {}", e);
            std::process::exit(1);
        }
    };

    let state = SearchState {
        query: query.to_string(),
        debounced_query: Some(query.to_string()),
        tracks,
        phase: SearchPhase::Success,
    };

    match TrackListView::build(&state, &PlaybackState::default()) {
        TrackListView::Rows(rows) => {
            for (i, row) in rows.iter().enumerate() {
                println!("{:2}. {} — {}", i + 1, row.title.green(), row.artist.cyan());
            }
            println!("\n{}", format!("Total: {} tracks", rows.len()).cyan());
        }
        TrackListView::Empty(notice) => println!("{}", notice.yellow()),
        TrackListView::Error(message) => println!("{}", message.red()),
        TrackListView::Loading => {}
    }

    Ok(())
}

fn show_setup_guide() {
    println!("{}", "deezer-discover Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. RapidAPI Setup".yellow());
    println!("   - Go to https://rapidapi.com/deezerdevs/api/deezer-1");
    println!("   - Subscribe to the Deezer API");
    println!("   - Copy your X-RapidAPI-Key");

    println!("\n{}", "2. Configuration".yellow());
    println!("   - Create a .env file with:");
    println!("     RAPIDAPI_KEY=your_rapidapi_key");
    println!("     RAPIDAPI_HOST=deezerdevs-deezer.p.rapidapi.com   (optional)");
    println!("     PORT=3001                                        (optional)");

    println!("\n{}", "3. Preview playback".yellow());
    println!("   - Previews play on the default audio device");
    println!("   - To use an external player instead, set PREVIEW_PLAYER,");
    println!("     e.g. PREVIEW_PLAYER=\"mpv --no-video --really-quiet\"");

    println!("\n{}", "4. Usage".yellow());
    println!("   - deezer-discover serve                 (start the proxy)");
    println!("   - deezer-discover search adele          (one-off search)");
    println!("   - deezer-discover browse                (search and play previews)");

    println!("\n{}", "Ready to discover!".green());
}
