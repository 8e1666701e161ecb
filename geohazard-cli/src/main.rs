//! geohazard CLI - hazard map assistant

#![deny(warnings)]

// Global invariants enforced:
// - A failed user action never ends an interactive chat session
// - Blank chat input produces no output and no log entry
// - Diagnostics go to stderr, results to stdout

use anyhow::Context;
use clap::{Parser, Subcommand};
use geohazard_core::config::{self, ResolvedConfig};
use geohazard_core::geojson;
use geohazard_core::image::ImageUpload;
use geohazard_core::report::render_transcript;
use geohazard_core::zones::{self, Layer};
use geohazard_core::{
    render_json, render_text, resolve_place_name, search_and_select, AssistantResponder,
    Coordinate, LocationAnalyzer, NominatimClient, SearchOutcome, Session,
};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "geohazard")]
#[command(about = "Hazard map assistant: analyze locations, search places and chat about disaster risk")]
#[command(version = env!("GEOHAZARD_VERSION"))]
struct Cli {
    /// Path to config file (default: auto-discover in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for hazard and population randomness (overrides config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the hazards of a coordinate
    Analyze {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true, value_parser = parse_degrees)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true, value_parser = parse_degrees)]
        lon: f64,

        /// Place name (default: reverse geocoded)
        #[arg(long)]
        name: Option<String>,

        /// Skip reverse geocoding when no name is given
        #[arg(long)]
        offline: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Search for a place and analyze the best match
    Search {
        /// Free-text place query
        query: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Ask the assistant a single question
    Ask {
        /// Message for the assistant
        message: String,

        /// Latitude of the current location
        #[arg(long, allow_negative_numbers = true, value_parser = parse_degrees, requires = "lon")]
        lat: Option<f64>,

        /// Longitude of the current location
        #[arg(long, allow_negative_numbers = true, value_parser = parse_degrees, requires = "lat")]
        lon: Option<f64>,

        /// Name of the current location (default: reverse geocoded)
        #[arg(long, requires = "lat")]
        name: Option<String>,

        /// Skip reverse geocoding when no name is given
        #[arg(long)]
        offline: bool,
    },
    /// Interactive chat session reading from stdin
    Chat,
    /// List the static hazard-zone overlays
    Zones {
        /// Only show these layers (repeatable)
        #[arg(long = "layer", value_parser = parse_layer)]
        layers: Vec<Layer>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Geojson,
}

fn parse_degrees(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", s));
    }
    Ok(value)
}

fn parse_layer(s: &str) -> Result<Layer, String> {
    s.parse::<Layer>().map_err(|e| e.to_string())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            lat,
            lon,
            name,
            offline,
            format,
        } => {
            let resolved = load_config(cli.config.as_deref(), cli.seed)?;
            let mut analyzer = LocationAnalyzer::from_config(&resolved);
            let mut session = Session::new();
            let coordinates = Coordinate::new(lat, lon);

            let place_name = if offline {
                name
            } else {
                let geocoder = NominatimClient::new(&resolved.geocoder)
                    .context("failed to create geocoding client")?;
                resolve_place_name(&geocoder, coordinates, name)
            };

            session.select_location(coordinates, place_name.as_deref(), &mut analyzer);
            print_session_report(&session, format);
        }
        Commands::Search { query, format } => {
            let resolved = load_config(cli.config.as_deref(), cli.seed)?;
            let mut analyzer = LocationAnalyzer::from_config(&resolved);
            let mut session = Session::new();
            let geocoder = NominatimClient::new(&resolved.geocoder)
                .context("failed to create geocoding client")?;

            match search_and_select(&geocoder, &query, &mut session, &mut analyzer)
                .with_context(|| format!("search for \"{}\" failed", query))?
            {
                SearchOutcome::Found(_) => print_session_report(&session, format),
                SearchOutcome::NotFound => println!("No results found for \"{}\"", query),
            }
        }
        Commands::Ask {
            message,
            lat,
            lon,
            name,
            offline,
        } => {
            let resolved = load_config(cli.config.as_deref(), cli.seed)?;
            let mut analyzer = LocationAnalyzer::from_config(&resolved);
            let responder = AssistantResponder::new();
            let mut session = Session::new();

            if let (Some(lat), Some(lon)) = (lat, lon) {
                let coordinates = Coordinate::new(lat, lon);
                let place_name = if offline {
                    name
                } else {
                    let geocoder = NominatimClient::new(&resolved.geocoder)
                        .context("failed to create geocoding client")?;
                    resolve_place_name(&geocoder, coordinates, name)
                };
                session.select_location(coordinates, place_name.as_deref(), &mut analyzer);
            }

            if let Some(reply) = session.submit_chat(&message, &responder, &mut analyzer) {
                println!("{}", reply.content);
            }
        }
        Commands::Chat => {
            let resolved = load_config(cli.config.as_deref(), cli.seed)?;
            run_chat(&resolved)?;
        }
        Commands::Zones { layers, format } => {
            let selected = if layers.is_empty() {
                zones::all_zones().to_vec()
            } else {
                zones::zones_in_layers(|layer| layers.contains(&layer))
            };

            match format {
                OutputFormat::Text => print!("{}", zones::render_text(&selected)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&selected)?),
                OutputFormat::Geojson => println!("{}", geojson::render_map(&selected, &[], None)),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let root = std::env::current_dir()?;
                match config::load_and_resolve(&root, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&root, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Load configuration from `--config` or the current directory, applying the seed override
fn load_config(config_path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<ResolvedConfig> {
    let root = std::env::current_dir()?;
    let mut resolved =
        config::load_and_resolve(&root, config_path).context("failed to load configuration")?;

    if let Some(ref p) = resolved.config_path {
        tracing::info!("using config: {}", p.display());
    }

    resolved.seed = seed.or(resolved.seed);
    Ok(resolved)
}

fn print_session_report(session: &Session, format: OutputFormat) {
    let Some(report) = session.last_report() else {
        return;
    };
    match format {
        OutputFormat::Text => print!("{}", render_text(report)),
        OutputFormat::Json => println!("{}", render_json(report)),
        OutputFormat::Geojson => println!(
            "{}",
            geojson::render_map(&session.visible_zones(), session.markers(), Some(report))
        ),
    }
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Geocoder:");
    println!("  base_url: {}", resolved.geocoder.base_url);
    println!("  user_agent: {}", resolved.geocoder.user_agent);
    println!("  timeout_ms: {}", resolved.geocoder.timeout_ms);
    println!("  limit: {}", resolved.geocoder.limit);
    println!(
        "  country_codes: {}",
        if resolved.geocoder.country_codes.is_empty() {
            "any".to_string()
        } else {
            resolved.geocoder.country_codes.join(",")
        }
    );
    println!();
    let rules = &resolved.hazard_rules;
    println!("Hazards:");
    println!("  fault_latitudes: {:?}", rules.fault_latitudes);
    println!("  fault_radius_deg: {}", rules.fault_radius_deg);
    println!(
        "  typhoon_lon: {} - {}",
        rules.typhoon_lon_min, rules.typhoon_lon_max
    );
    println!("  flood_lat: {} - {}", rules.flood_lat_min, rules.flood_lat_max);
    println!("  tsunami_threshold: {}", rules.tsunami_threshold);
    println!(
        "  landslide_lat: > {} or {} - {}",
        rules.landslide_lat_north, rules.landslide_lat_min, rules.landslide_lat_max
    );
    println!();
    let weights = &resolved.resilience_weights;
    println!("Resilience:");
    println!("  base: {}", weights.base);
    println!("  high_penalty: {}", weights.high_penalty);
    println!("  moderate_penalty: {}", weights.moderate_penalty);
    println!("  floor: {}", weights.floor);
    println!();
    println!("Session:");
    println!(
        "  seed: {}",
        resolved
            .seed
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("  analysis_delay_ms: {}", resolved.analysis_delay_ms);
}

const CHAT_HELP: &str = "Commands:
  /goto <lat> <lon> [name]  select a location (name is reverse geocoded when omitted)
  /search <query>           search for a place and select it
  /image <path>             attach an image
  /layer <name>             toggle an overlay layer
  /zones                    list visible hazard zones
  /history                  show the conversation
  /help                     show this help
  /quit                     leave the chat
Anything else is sent to the assistant.";

/// State of the interactive chat controller
struct ChatController<'a> {
    config: &'a ResolvedConfig,
    session: Session,
    analyzer: LocationAnalyzer,
    responder: AssistantResponder,
    geocoder: Option<NominatimClient>,
}

enum ChatFlow {
    Continue,
    Quit,
}

fn run_chat(resolved: &ResolvedConfig) -> anyhow::Result<()> {
    let geocoder = match NominatimClient::new(&resolved.geocoder) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(error = %e, "geocoding unavailable, /search and unnamed /goto disabled");
            None
        }
    };

    let mut controller = ChatController {
        config: resolved,
        session: Session::new(),
        analyzer: LocationAnalyzer::from_config(resolved),
        responder: AssistantResponder::new(),
        geocoder,
    };

    println!("geohazard chat - type /help for commands, /quit to leave");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read chat input")?;
        let mut out = stdout.lock();
        match controller.handle_line(&line, &mut out)? {
            ChatFlow::Continue => out.flush()?,
            ChatFlow::Quit => break,
        }
    }
    stdout.flush()?;

    Ok(())
}

impl ChatController<'_> {
    fn handle_line(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<ChatFlow> {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            if let Some(reply) =
                self.session
                    .submit_chat(trimmed, &self.responder, &mut self.analyzer)
            {
                writeln!(out, "assistant> {}", reply.content)?;
            }
            return Ok(ChatFlow::Continue);
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };

        let result = match name {
            "quit" | "exit" => return Ok(ChatFlow::Quit),
            "help" => writeln!(out, "{}", CHAT_HELP).map_err(anyhow::Error::from),
            "goto" => self.goto(rest, out),
            "search" => self.search(rest, out),
            "image" => self.image(rest, out),
            "layer" => self.layer(rest, out),
            "zones" => write!(out, "{}", zones::render_text(&self.session.visible_zones()))
                .map_err(anyhow::Error::from),
            "history" => write!(
                out,
                "{}",
                render_transcript(self.session.conversation().all())
            )
            .map_err(anyhow::Error::from),
            other => Err(anyhow::anyhow!("unknown command /{} (try /help)", other)),
        };

        // A failed action is reported and the session carries on
        if let Err(e) = result {
            writeln!(out, "error: {:#}", e)?;
        }
        Ok(ChatFlow::Continue)
    }

    fn goto(&mut self, args: &str, out: &mut impl Write) -> anyhow::Result<()> {
        let mut parts = args.splitn(3, char::is_whitespace);
        let (Some(lat), Some(lon)) = (parts.next(), parts.next()) else {
            anyhow::bail!("usage: /goto <lat> <lon> [name]");
        };
        let lat = parse_degrees(lat).map_err(anyhow::Error::msg)?;
        let lon = parse_degrees(lon).map_err(anyhow::Error::msg)?;
        let coordinates = Coordinate::new(lat, lon);

        let name = parts
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let place_name = match &self.geocoder {
            Some(geocoder) => resolve_place_name(geocoder, coordinates, name),
            None => name,
        };

        let report = self
            .session
            .select_location(coordinates, place_name.as_deref(), &mut self.analyzer);
        write!(out, "{}", render_text(report))?;
        Ok(())
    }

    fn search(&mut self, query: &str, out: &mut impl Write) -> anyhow::Result<()> {
        if query.is_empty() {
            anyhow::bail!("usage: /search <query>");
        }
        let Some(geocoder) = &self.geocoder else {
            anyhow::bail!("geocoding is unavailable");
        };

        match search_and_select(geocoder, query, &mut self.session, &mut self.analyzer)
            .with_context(|| format!("search for \"{}\" failed", query))?
        {
            SearchOutcome::Found(_) => {
                if let Some(report) = self.session.last_report() {
                    write!(out, "{}", render_text(report))?;
                }
            }
            SearchOutcome::NotFound => writeln!(out, "No results found for \"{}\"", query)?,
        }
        Ok(())
    }

    fn image(&mut self, path: &str, out: &mut impl Write) -> anyhow::Result<()> {
        if path.is_empty() {
            anyhow::bail!("usage: /image <path>");
        }
        let upload = ImageUpload::from_path(Path::new(path))?;

        writeln!(out, "Analyzing {}...", upload.file_name)?;
        out.flush()?;
        std::thread::sleep(Duration::from_millis(self.config.analysis_delay_ms));

        let reply = self.session.submit_image(&upload);
        writeln!(out, "assistant> {}", reply.content)?;
        Ok(())
    }

    fn layer(&mut self, name: &str, out: &mut impl Write) -> anyhow::Result<()> {
        let layer: Layer = name.parse()?;
        let active = self.session.toggle_layer(layer);
        writeln!(
            out,
            "Layer {} {}",
            layer,
            if active { "shown" } else { "hidden" }
        )?;
        Ok(())
    }
}
