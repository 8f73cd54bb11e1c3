//! Subcommand implementations.
//!
//! Each command loads what it needs, performs one logical operation and exits.
//! Reports go to stdout; errors bubble up to `main`.

use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use contract_fill::{
    check, check_template, generate, ContractRouter, ContractState, Directive, FillError, RawValue, Readiness,
    Registry, RouteRequest, StateFile, UpdateEngine,
};
use contract_fill_docx::{placeholders_in_archive, DocxFiller};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::cli::{Cli, Command, GenerateArgs, InitArgs, UpdateArgs};
use crate::config::FillConfig;
use crate::report;

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The contract still has unresolved fields; exits with status 2.
    Incomplete,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Incomplete => ExitCode::from(2),
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let mut config = FillConfig::load(&cli.config)?;
    if let Some(dir) = cli.templates_dir {
        config.templates_dir = dir;
    }
    let registry = contract_fill_registry::builtin().context("built-in contract definitions")?;

    match cli.command {
        Command::Types => {
            print!("{}", report::types_table(&registry.summaries()));
            Ok(Outcome::Done)
        }
        Command::Init(args) => init(registry, &config, args),
        Command::Update(args) => update(registry, &config, args),
        Command::Generate(args) => generate_document(registry, &config, args),
    }
}

fn init(registry: &Registry, config: &FillConfig, args: InitArgs) -> anyhow::Result<Outcome> {
    let request = match (&args.contract_type, &args.intent) {
        (Some(code), _) => RouteRequest::Code(code),
        (None, Some(intent)) => RouteRequest::Intent(intent),
        (None, None) => bail!("either --type or --intent is required"),
    };

    let def = match ContractRouter::new(registry).resolve(request) {
        Ok(def) => def,
        Err(err @ FillError::AmbiguousIntent { .. }) => {
            eprint!("{}", report::types_table(&registry.summaries()));
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    let file = StateFile::new(&args.state);
    if file.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to start over",
            args.state.display()
        );
    }

    let template = config.templates_dir.join(def.template());
    if template.exists() {
        let bytes = std::fs::read(&template)
            .with_context(|| format!("reading template {}", template.display()))?;
        let placeholders = placeholders_in_archive(&bytes)
            .with_context(|| format!("reading template {}", template.display()))?;
        check_template(def, &template.display().to_string(), &placeholders)?;
        println!("模板 {} 的 {} 个占位符均有对应字段", template.display(), placeholders.len());
    }

    let state = ContractState::new(def);
    file.persist(def, &state)?;
    info!(contract = def.code(), path = %args.state.display(), "initialized contract");

    println!(
        "已创建 {}（{}，{}），共 {} 个字段",
        def.name(),
        def.code(),
        def.standard_code(),
        def.field_count()
    );
    print!(
        "{}",
        report::progress_report(def, &state, config.max_listed_fields)
    );
    Ok(Outcome::Done)
}

fn update(registry: &Registry, config: &FillConfig, args: UpdateArgs) -> anyhow::Result<Outcome> {
    let file = StateFile::new(&args.state);
    let (def, state) = file.load(registry)?;

    let batch = collect_batch(&args)?;
    if batch.is_empty() && !args.show {
        bail!("nothing to do: pass --field/--value, --json, --skip or --show");
    }

    let state = if batch.is_empty() {
        state
    } else {
        let mut next = UpdateEngine::new(def).apply_all(&state, batch)?;
        let changed = next.changed_fields(&state).len();
        if changed == 0 {
            println!("没有字段发生变化");
            state
        } else {
            next.touch(Utc::now());
            file.persist(def, &next)?;
            println!("已更新 {} 个字段", changed);
            next
        }
    };

    if args.show {
        print!("{}", report::values_report(def, &state));
    }
    print!(
        "{}",
        report::progress_report(def, &state, config.max_listed_fields)
    );
    Ok(Outcome::Done)
}

/// `--json` entries in object order, then `--field/--value`, then `--skip`s.
fn collect_batch(args: &UpdateArgs) -> anyhow::Result<Vec<(String, Directive)>> {
    let mut batch = Vec::new();

    if let Some(json) = &args.json {
        let object: serde_json::Map<String, JsonValue> =
            serde_json::from_str(json).context("--json must be a JSON object")?;
        for (name, value) in object {
            let directive = json_directive(&name, value)?;
            batch.push((name, directive));
        }
    }
    if let (Some(field), Some(value)) = (&args.field, &args.value) {
        batch.push((field.clone(), Directive::Set(RawValue::from(value.as_str()))));
    }
    for name in &args.skip {
        batch.push((name.clone(), Directive::Skip));
    }
    Ok(batch)
}

fn json_directive(name: &str, value: JsonValue) -> anyhow::Result<Directive> {
    match value {
        JsonValue::String(s) => Ok(Directive::text(s)),
        JsonValue::Bool(b) => Ok(Directive::flag(b)),
        JsonValue::Number(n) => Ok(Directive::text(n.to_string())),
        JsonValue::Null => Err(anyhow!(
            "`{}`: null is not a value; use --skip to skip a field",
            name
        )),
        other => Err(anyhow!("`{}`: unsupported value {}", name, other)),
    }
}

fn generate_document(
    registry: &Registry,
    config: &FillConfig,
    args: GenerateArgs,
) -> anyhow::Result<Outcome> {
    let (def, state) = StateFile::new(&args.state).load(registry)?;

    let output = match (&args.output, args.check) {
        (_, true) | (None, _) => {
            return Ok(match check(def, &state) {
                Readiness::Ready => {
                    println!("{}（{}）已就绪，可以生成合同", def.name(), def.code());
                    Outcome::Done
                }
                Readiness::Incomplete(deficiencies) => {
                    print!(
                        "{}",
                        report::deficiency_report(&deficiencies, config.max_listed_fields)
                    );
                    Outcome::Incomplete
                }
            })
        }
        (Some(output), false) => output,
    };

    let mut filler = DocxFiller::new(&config.templates_dir, output);
    if let Some(template) = &args.template {
        filler = filler.with_template(template);
    }

    match generate(def, &state, &filler) {
        Ok(filled) => {
            println!(
                "已生成 {}：替换 {} 处占位符",
                filled.path.display(),
                filled.replaced
            );
            Ok(Outcome::Done)
        }
        Err(FillError::NotReady(deficiencies)) => {
            print!(
                "{}",
                report::deficiency_report(&deficiencies, config.max_listed_fields)
            );
            Ok(Outcome::Incomplete)
        }
        Err(err) => Err(err.into()),
    }
}
