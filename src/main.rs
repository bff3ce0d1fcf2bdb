// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tracing_subscriber::EnvFilter;

use filament::config::RunOptions;
use filament::engine::{run, ChainOutcome, Completion};
use filament::errors::StepError;
use filament::steps::{FilterStep, ThenStage};

/// Shared execution context for the demo chains.
struct PipelineLog {
    entries: Mutex<Vec<String>>,
}

impl PipelineLog {
    fn new() -> Arc<Self> {
        Arc::new(PipelineLog {
            entries: Mutex::new(Vec::new()),
        })
    }

    fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }
}

type DemoStep = FilterStep<PipelineLog, StepError, String>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let demos: Vec<(&str, fn())> = vec![
        ("ordering", demo_ordering as fn()),
        ("interpose", demo_interpose),
        ("fault", demo_fault),
        ("then-stage", demo_then_stage),
        ("deferred", demo_deferred),
    ];

    match args.get(1).map(String::as_str) {
        None => {
            println!("🔗 filament chain executor demo");
            println!("═══════════════════════════════");
            for (i, (name, demo)) in demos.iter().enumerate() {
                if i > 0 {
                    println!("\n{}", "─".repeat(60));
                }
                println!("▶ {}", name);
                demo();
            }
        }
        Some(picked) => match demos.iter().find(|(name, _)| *name == picked) {
            Some((name, demo)) => {
                println!("▶ {}", name);
                demo();
            }
            None => {
                eprintln!("Usage: {} [demo]", args[0]);
                eprintln!(
                    "Demos: {}",
                    demos
                        .iter()
                        .map(|(name, _)| *name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                bail!("unknown demo '{picked}'");
            }
        },
    }

    Ok(())
}

fn print_outcome(outcome: &ChainOutcome<StepError, String>) {
    match outcome {
        Ok(Some(value)) => println!("  done: value = {value:?}"),
        Ok(None) => println!("  done: ok"),
        Err(error) => println!("  done: error = {error}"),
    }
}

/// Simple filters run in iterator order; the handler resolves afterwards.
fn demo_ordering() {
    let log = PipelineLog::new();

    let steps: Vec<DemoStep> = ["trim", "tokenize", "count"]
        .into_iter()
        .map(|stage| {
            FilterStep::simple(move |scope: Arc<PipelineLog>| {
                scope.record(stage);
                Ok(())
            })
        })
        .collect();

    run(
        steps,
        RunOptions::shared(log.clone()).on_done(|outcome| print_outcome(&outcome)),
    );

    println!("  stages ran: {:?}", log.entries.lock().unwrap());
}

/// A continuation filter wraps everything downstream: it interposes its own
/// completion, observes the downstream outcome, and forwards it to the
/// handler it was itself given.
fn demo_interpose() {
    let log = PipelineLog::new();

    let timing: DemoStep = FilterStep::continuation(|_scope, next, callback| {
        let started = Instant::now();
        let after = Completion::from_fn(move |outcome| {
            println!(
                "  downstream finished in {:?}, forwarding outcome",
                started.elapsed()
            );
            callback.resolve(outcome);
        });
        next.proceed_with(after);
        Ok(())
    });

    let work: DemoStep = FilterStep::continuation(|scope: Arc<PipelineLog>, _next, callback| {
        scope.record("work");
        callback.deliver("42 tokens".to_string());
        Ok(())
    });

    run(
        vec![timing, work],
        RunOptions::shared(log).on_done(|outcome| print_outcome(&outcome)),
    );
}

/// A failing step never stops the chain; the captured error travels to the
/// completion handler while later steps still run.
fn demo_fault() {
    let log = PipelineLog::new();

    let failing: DemoStep =
        FilterStep::simple(|_scope| Err(StepError::msg("upstream service unavailable")));
    let survivor_log = log.clone();
    let survivor: DemoStep = FilterStep::simple(move |_scope| {
        survivor_log.record("survivor ran anyway");
        Ok(())
    });

    run(
        vec![failing, survivor],
        RunOptions::shared(log.clone()).on_done(|outcome| print_outcome(&outcome)),
    );

    println!("  log: {:?}", log.entries.lock().unwrap());
}

/// A handoff then-stage takes over delivery once the steps are exhausted.
fn demo_then_stage() {
    let log = PipelineLog::new();

    let steps: Vec<DemoStep> = vec![FilterStep::simple(|scope: Arc<PipelineLog>| {
        scope.record("ingest");
        Ok(())
    })];

    run(
        steps,
        RunOptions::shared(log)
            .then_stage(ThenStage::handoff(|scope: Arc<PipelineLog>, completion| {
                let summary = scope.entries.lock().unwrap().join(" -> ");
                completion.deliver(format!("pipeline: {summary}"));
                Ok(())
            }))
            .on_done(|outcome| print_outcome(&outcome)),
    );
}

/// A continuation filter may park the chain and resume it from another
/// thread; the handle carries everything needed to continue.
fn demo_deferred() {
    let log = PipelineLog::new();
    let (tx, rx) = mpsc::channel();

    let parking: DemoStep = FilterStep::continuation(|_scope, next, _callback| {
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            next.proceed();
        });
        Ok(())
    });

    let resumed_log = log.clone();
    let resumed: DemoStep = FilterStep::simple(move |_scope| {
        resumed_log.record("resumed on the worker's schedule");
        Ok(())
    });

    run(
        vec![parking, resumed],
        RunOptions::shared(log.clone()).on_done(move |outcome| {
            tx.send(outcome).ok();
        }),
    );

    match rx.recv_timeout(Duration::from_secs(2)) {
        Ok(outcome) => {
            print_outcome(&outcome);
            println!("  log: {:?}", log.entries.lock().unwrap());
        }
        Err(_) => println!("  ❌ deferred chain never completed"),
    }
}
