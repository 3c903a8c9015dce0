//! Command-line front end: resolves names through a chosen configuration
//! and reports what the cache did.
//!
//! Logging goes to stderr and is filtered by `RUST_LOG`. The resolver kind
//! comes from `--cache`, then `TYPE_RESOLVERS_CACHE`, then the default.
use crate::{
    loader::{LoaderContext, RegistryLoader, SharedLoader, TypeLoader},
    metrics::CacheStat,
    resolver::{
        factory::{self, ResolverKind},
        TypeResolver,
    },
    types::LoaderId,
};
use clap::Parser;
use serde::Serialize;
use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Resolve type names through a caching type resolver"
)]
pub struct Args {
    /// Resolver configuration (no-cache, weak-cache, soft-cache,
    /// weak-cache-concurrent, soft-cache-concurrent)
    #[arg(short, long, value_name = "KIND")]
    pub cache: Option<ResolverKind>,
    /// Define a type in a fresh loader used instead of the built-in one
    #[arg(short, long, value_name = "NAME")]
    pub define: Vec<String>,
    /// Resolve every name this many times
    #[arg(short, long, default_value_t = 1)]
    pub repeat: u32,
    /// Signal memory pressure to the cache after every round
    #[arg(long)]
    pub pressure: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
    #[arg(value_name = "TYPE", required = true)]
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Outcome {
    pub name: String,
    pub round: u32,
    pub loader: Option<LoaderId>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub kind: ResolverKind,
    pub loader: LoaderId,
    pub loads: Option<u64>,
    pub outcomes: Vec<Outcome>,
    pub stats: Option<CacheStat>,
}

impl Report {
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.error.is_none())
    }
}

pub fn resolve_all(args: &Args, kind: ResolverKind) -> Report {
    let registry = (!args.define.is_empty())
        .then(|| Arc::new(RegistryLoader::with_types("cli", args.define.clone())));
    let explicit = registry.clone().map(|r| r as SharedLoader);

    let resolver = factory::build(kind, explicit, &LoaderContext::new());
    let mut outcomes = Vec::new();
    for round in 1..=args.repeat {
        for name in &args.names {
            let outcome = match resolver.resolve(name) {
                Ok(handle) => Outcome {
                    name: name.clone(),
                    round,
                    loader: Some(handle.defining_loader()),
                    error: None,
                },
                Err(e) => Outcome {
                    name: name.clone(),
                    round,
                    loader: None,
                    error: Some(e.to_string()),
                },
            };
            outcomes.push(outcome);
        }
        if args.pressure {
            resolver.reclaim_soft();
        }
    }

    Report {
        kind,
        loader: resolver.loader().id(),
        loads: registry.map(|r| r.total_loads()),
        outcomes,
        stats: resolver.stats(),
    }
}

pub fn write_report(report: &Report, json: bool, out: &mut impl Write) -> io::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        return writeln!(out);
    }

    writeln!(out, "Resolver: {} (loader {})", report.kind, report.loader)?;
    for o in &report.outcomes {
        match (&o.loader, &o.error) {
            (Some(loader), _) => writeln!(out, "  [{}] {} -> loader {}", o.round, o.name, loader)?,
            (None, Some(e)) => writeln!(out, "  [{}] {} -> error: {}", o.round, o.name, e)?,
            (None, None) => {}
        }
    }
    if let Some(loads) = report.loads {
        writeln!(out, "Loads: {loads}")?;
    }
    match &report.stats {
        Some(stats) => writeln!(out, "Cache: {stats}"),
        None => writeln!(out, "Cache: disabled"),
    }
}

pub fn run_cli() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let kind = match args.cache {
        Some(kind) => kind,
        None => match ResolverKind::from_env() {
            Ok(kind) => kind.unwrap_or_default(),
            Err(e) => {
                eprintln!("Error reading {}: {}", factory::CACHE_ENV_VAR, e);
                return ExitCode::from(2);
            }
        },
    };

    let report = resolve_all(&args, kind);
    if let Err(e) = write_report(&report, args.json, &mut io::stdout().lock()) {
        eprintln!("Error writing report: {}", e);
        return ExitCode::from(1);
    }

    if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
