use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use linkpress::file_finder::{DEFAULT_IGNORE_PATTERNS, find_config_files};
use linkpress::{
    Config, DefaultActionFlag, ExternalOpener, Intercept, LinkEngine, LinkLabel, Modal,
    ModalControls, Modifiers, NavigationAction, NavigationDispatcher, NavigationRequest,
    PointerButton, PressEvent, RouteDescriptor, ShareSheet, Surface,
};
use serde_json::{Value, json};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "linkpress", version, about = "Resolve link presses against an app's routes")]
struct Cli {
    /// Config file to load; may be repeated, later files override earlier ones
    #[arg(long = "config", global = true)]
    configs: Vec<PathBuf>,

    /// Directory searched for linkpress.json files
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a press (or long press) on a link and print the outcome
    Resolve(ResolveArgs),
    /// Match a canonical path against the route table
    Route {
        path: String,
    },
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// URL, deep link or path
    #[arg(required_unless_present = "screen")]
    target: Option<String>,

    /// Screen name for a structured target
    #[arg(long, conflicts_with = "target")]
    screen: Option<String>,

    /// Screen param as key=value; may be repeated
    #[arg(long = "param", value_parser = parse_param, requires = "screen")]
    params: Vec<(String, String)>,

    /// Visible link text
    #[arg(long)]
    text: Option<String>,

    /// The link renders child elements rather than plain text
    #[arg(long, conflicts_with = "text")]
    composite: bool,

    /// push, replace or navigate
    #[arg(long)]
    action: Option<NavigationAction>,

    #[arg(long)]
    meta: bool,
    #[arg(long)]
    alt: bool,
    #[arg(long)]
    ctrl: bool,
    #[arg(long)]
    shift: bool,
    #[arg(long)]
    middle: bool,

    /// Treat the surface as touch-only regardless of config
    #[arg(long)]
    touch: bool,

    /// Skip the link text mismatch check
    #[arg(long)]
    no_warning: bool,

    /// Simulate a pre-press hook that stops the press
    #[arg(long)]
    intercept: bool,

    /// Resolve a long press instead of a press
    #[arg(long)]
    long_press: bool,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

/// Host that records what the engine asked the platform to do.
#[derive(Default)]
struct RecordingHost {
    effects: Vec<Value>,
}

impl NavigationDispatcher for RecordingHost {
    fn dispatch(&mut self, request: NavigationRequest) {
        self.effects.push(json!({ "dispatch": request }));
    }
}

impl ModalControls for RecordingHost {
    fn open_modal(&mut self, modal: Modal) {
        self.effects.push(json!({ "openModal": modal }));
    }

    fn close_modal(&mut self) {
        self.effects.push(json!({ "closeModal": Value::Null }));
    }
}

impl ExternalOpener for RecordingHost {
    fn open_url(&mut self, href: &str) {
        self.effects.push(json!({ "openUrl": href }));
    }
}

impl ShareSheet for RecordingHost {
    fn share_url(&mut self, url: &str) {
        self.effects.push(json!({ "share": url }));
    }
}

fn load_config(cli: &Cli) -> linkpress::Result<Config> {
    let mut paths = Vec::new();
    if let Some(root) = &cli.root {
        paths.extend(find_config_files(root, &DEFAULT_IGNORE_PATTERNS));
    }
    paths.extend(cli.configs.iter().cloned());
    debug!(files = paths.len(), "loading config");

    Config::new(paths)
}

fn run_resolve(config: &mut Config, args: ResolveArgs) -> linkpress::Result<Value> {
    if args.touch {
        config.surface = Some(Surface::Touch);
    }
    let engine = LinkEngine::from_config(config)?;

    let mut link = match (args.target, args.screen) {
        (Some(target), _) => engine.link(target),
        (None, Some(screen)) => {
            let mut route = RouteDescriptor::new(screen);
            route.params.extend(args.params);
            engine.link(route)
        }
        (None, None) => engine.link(String::new()),
    };
    if let Some(text) = args.text {
        link = link.with_text(text);
    } else if args.composite {
        link = link.with_label(LinkLabel::Composite);
    }
    if let Some(action) = args.action {
        link = link.with_action(action);
    }
    if args.no_warning {
        link = link.without_mismatch_warning();
    }

    let mut host = RecordingHost::default();
    let outcome = if args.long_press {
        serde_json::to_value(engine.long_press(&mut host, &link))
    } else {
        let event = PressEvent {
            button: if args.middle {
                PointerButton::Middle
            } else {
                PointerButton::Primary
            },
            modifiers: Modifiers {
                meta: args.meta,
                alt: args.alt,
                ctrl: args.ctrl,
                shift: args.shift,
            },
        };
        let mut default = DefaultActionFlag::default();
        let mut stop = |_: &PressEvent| Intercept::Stop;
        let intercept = if args.intercept {
            Some(&mut stop as &mut linkpress::Interceptor<'_>)
        } else {
            None
        };
        serde_json::to_value(engine.press(&mut host, &link, &event, &mut default, intercept))
    }
    .unwrap_or(Value::Null);

    Ok(json!({
        "href": link.href(),
        "isExternal": link.is_external(),
        "outcome": outcome,
        "effects": host.effects,
    }))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "config load failed");
            eprintln!("Error loading config: {}", err);
            eprintln!(
                "Please ensure each linkpress.json is valid JSON and follows the expected format."
            );
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Resolve(args) => run_resolve(&mut config, args),
        Command::Route { path } => LinkEngine::from_config(&config).map(|engine| {
            json!({
                "path": &path,
                "route": engine.match_route(&path),
            })
        }),
    };

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
