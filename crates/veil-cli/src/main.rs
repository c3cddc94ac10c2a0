use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use veil_classfile::ClassStub;
use veil_config::{DictionaryKind, VeilConfig};
use veil_hierarchy::{
    build_hierarchy, BuildOptions, Diagnostic, Diagnostics, HierarchyMode, Origin, ProviderChain,
    Severity, StubSet,
};
use veil_jdk::JdkIndex;
use veil_remap::{
    remap, AlphabetGenerator, DictionaryGenerator, KeepRuleSpec, KeepRules, NameGenerator,
    NameMapping, RemapContext, RemapOptions,
};

#[derive(Parser)]
#[command(name = "veil", version, about = "Veil CLI (safe renaming of JVM class stubs)")]
struct Cli {
    /// Config file (defaults to `$VEIL_CONFIG_PATH`, then `./veil.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rename program classes and members, writing the mapping and rewritten program
    Remap(RemapArgs),
    /// Show the resolved ancestors and descendants of one class
    Hierarchy(HierarchyArgs),
    /// Print the JSON schema of `veil.toml`
    Schema,
}

#[derive(Args)]
struct InputArgs {
    /// Program classes (JSON array of class stubs)
    #[arg(long)]
    program: PathBuf,
    /// Library classes (JSON array of class stubs); may be repeated
    #[arg(long = "library")]
    libraries: Vec<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MappingFormat {
    /// One `key -> name` line per entry
    Text,
    Json,
}

#[derive(Args)]
struct RemapArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Write the mapping here instead of stdout
    #[arg(long)]
    mapping: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = MappingFormat::Text)]
    mapping_format: MappingFormat,
    /// Write the rewritten program (JSON array of class stubs) here
    #[arg(long)]
    output: Option<PathBuf>,
    /// Exit with status 1 when the run reports error diagnostics
    #[arg(long)]
    deny_errors: bool,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct HierarchyArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Internal name of the class to inspect, e.g. `com/example/Main`
    class: String,
    /// Also report the most specific common ancestor with this class
    #[arg(long)]
    common_with: Option<String>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    if let Command::Schema = cli.command {
        let schema = veil_config::json_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(0);
    }

    let config = load_config(cli.config.as_deref())?;
    veil_config::init_tracing(&config.logging);

    match cli.command {
        Command::Remap(args) => remap_command(&config, args),
        Command::Hierarchy(args) => hierarchy_command(&config, args),
        Command::Schema => Ok(0),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<VeilConfig> {
    match explicit {
        Some(path) => VeilConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("reading current directory")?;
            let (config, path) = veil_config::load_for_dir(&cwd)?;
            match &path {
                Some(path) => tracing::debug!(target: "veil.cli", path = %path.display(), "loaded config"),
                None => tracing::debug!(target: "veil.cli", "no config file found; using defaults"),
            }
            Ok(config)
        }
    }
}

fn read_stubs(path: &Path) -> Result<Vec<ClassStub>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let stubs: Vec<ClassStub> = serde_json::from_str(&text)
        .with_context(|| format!("parsing class stubs in {}", path.display()))?;
    tracing::debug!(target: "veil.cli", path = %path.display(), classes = stubs.len(), "read class stubs");
    Ok(stubs)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

fn platform(config: &VeilConfig) -> Result<JdkIndex> {
    let mut index = if config.platform.builtin {
        JdkIndex::new()
    } else {
        JdkIndex::empty()
    };
    for path in &config.platform.stubs {
        index
            .load_json(path)
            .with_context(|| format!("loading platform stubs {}", path.display()))?;
    }
    Ok(index)
}

fn generator(config: &VeilConfig) -> Result<Box<dyn NameGenerator>> {
    let rename = &config.rename;
    Ok(match rename.dictionary {
        DictionaryKind::Alphabet => match &rename.alphabet {
            Some(alphabet) => Box::new(AlphabetGenerator::with_alphabet(alphabet)),
            None => Box::new(AlphabetGenerator::new()),
        },
        DictionaryKind::Words => {
            let path = rename
                .words
                .as_deref()
                .context("`rename.words` must be set for the words dictionary")?;
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading word list {}", path.display()))?;
            Box::new(DictionaryGenerator::from_lines(&text))
        }
    })
}

fn remap_options(config: &VeilConfig) -> RemapOptions {
    let rename = &config.rename;
    RemapOptions {
        rename_classes: rename.classes,
        rename_fields: rename.fields,
        rename_methods: rename.methods,
        share_overloads: rename.share_overloads,
        flatten_package: rename.flatten_package.clone(),
        keep_main: rename.keep_main,
        parallel: rename.parallel,
    }
}

fn keep_rules(config: &VeilConfig) -> Result<KeepRules> {
    let specs: Vec<KeepRuleSpec> = config
        .keep
        .iter()
        .map(|rule| KeepRuleSpec {
            class: rule.class.clone(),
            member: rule.member.clone(),
            members: rule.members,
        })
        .collect();
    Ok(KeepRules::new(&specs)?)
}

#[derive(Serialize)]
struct DiagnosticEntry {
    severity: Severity,
    code: &'static str,
    message: String,
    #[serde(flatten)]
    detail: Diagnostic,
}

fn diagnostic_entries(diagnostics: &Diagnostics) -> Vec<DiagnosticEntry> {
    diagnostics
        .to_vec()
        .into_iter()
        .map(|diagnostic| DiagnosticEntry {
            severity: diagnostic.severity(),
            code: diagnostic.code(),
            message: diagnostic.to_string(),
            detail: diagnostic,
        })
        .collect()
}

fn print_diagnostics(entries: &[DiagnosticEntry]) {
    for entry in entries {
        let severity = match entry.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        println!("{severity}[{}]: {}", entry.code, entry.message);
    }
}

#[derive(Serialize)]
struct RemapSummary {
    classes: usize,
    renamed_classes: usize,
    mapping_entries: usize,
    errors: usize,
    warnings: usize,
}

#[derive(Serialize)]
struct RemapReport<'a> {
    summary: RemapSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    mapping: Option<&'a NameMapping>,
    diagnostics: Vec<DiagnosticEntry>,
}

fn remap_command(config: &VeilConfig, args: RemapArgs) -> Result<i32> {
    let program: StubSet = read_stubs(&args.input.program)?.into_iter().collect();
    let mut context = RemapContext::new(program, generator(config)?)
        .with_options(remap_options(config))
        .with_keep_rules(keep_rules(config)?)
        .with_platform(platform(config)?);
    for path in &args.input.libraries {
        let library: StubSet = read_stubs(path)?.into_iter().collect();
        context = context.with_library(library);
    }
    tracing::info!(
        target: "veil.cli",
        program = %args.input.program.display(),
        libraries = args.input.libraries.len(),
        "remapping program"
    );

    let output = remap(context)?;

    if let Some(path) = &args.mapping {
        let contents = match args.mapping_format {
            MappingFormat::Text => output.mapping.to_text(),
            MappingFormat::Json => output.mapping.to_json_pretty()?,
        };
        write_file(path, &contents)?;
    }
    if let Some(path) = &args.output {
        write_file(path, &serde_json::to_string_pretty(&output.program)?)?;
    }

    let has_errors = output.diagnostics.has_errors();
    let report = RemapReport {
        summary: RemapSummary {
            classes: output.program.len(),
            renamed_classes: output.mapping.classes().count(),
            mapping_entries: output.mapping.len(),
            errors: output.diagnostics.count(Severity::Error),
            warnings: output.diagnostics.count(Severity::Warning),
        },
        mapping: args.mapping.is_none().then_some(&output.mapping),
        diagnostics: diagnostic_entries(&output.diagnostics),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(mapping) = report.mapping {
            print!("{}", mapping.to_text());
        }
        print_diagnostics(&report.diagnostics);
        let summary = &report.summary;
        println!(
            "summary: {} classes, {} renamed, {} mapping entries, {} errors, {} warnings",
            summary.classes,
            summary.renamed_classes,
            summary.mapping_entries,
            summary.errors,
            summary.warnings
        );
    }

    tracing::info!(
        target: "veil.cli",
        classes = report.summary.classes,
        renamed = report.summary.renamed_classes,
        mapping_entries = report.summary.mapping_entries,
        errors = report.summary.errors,
        warnings = report.summary.warnings,
        "remap finished"
    );
    if args.deny_errors && has_errors {
        tracing::warn!(
            target: "veil.cli",
            errors = report.summary.errors,
            "failing run: error diagnostics with --deny-errors"
        );
        return Ok(1);
    }
    Ok(0)
}

#[derive(Serialize)]
struct HierarchyReport {
    class: String,
    origin: Origin,
    interface: bool,
    depends_on_missing: bool,
    ancestors: Vec<String>,
    descendants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    common_ancestor: Option<CommonAncestor>,
    diagnostics: Vec<DiagnosticEntry>,
}

#[derive(Serialize)]
struct CommonAncestor {
    with: String,
    ancestor: Option<String>,
}

fn hierarchy_command(config: &VeilConfig, args: HierarchyArgs) -> Result<i32> {
    let program: StubSet = read_stubs(&args.input.program)?.into_iter().collect();
    let program_names: Vec<String> = program.names().into_iter().map(str::to_string).collect();
    let mut providers = ProviderChain::new(program).with_platform(platform(config)?);
    for path in &args.input.libraries {
        let library: StubSet = read_stubs(path)?.into_iter().collect();
        providers = providers.with_library(library);
    }

    let roots = program_names
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(args.class.as_str()))
        .chain(args.common_with.as_deref());
    let mut diagnostics = Diagnostics::new();
    let graph = build_hierarchy(
        &providers,
        roots,
        BuildOptions {
            mode: HierarchyMode::Fast,
            parallel: config.rename.parallel,
        },
        &mut diagnostics,
    );

    tracing::debug!(
        target: "veil.cli",
        classes = graph.class_count(),
        class = %args.class,
        "built class hierarchy"
    );
    let id = graph.require(&args.class)?;
    let class = graph.class(id);
    let names = |ids: &std::collections::BTreeSet<_>| -> Vec<String> {
        let mut names: Vec<String> = ids
            .iter()
            .map(|&id| graph.class(id).name().to_string())
            .collect();
        names.sort();
        names
    };
    let common_ancestor = match &args.common_with {
        Some(other) => {
            let other_id = graph.require(other)?;
            Some(CommonAncestor {
                with: other.clone(),
                ancestor: graph
                    .common_ancestor(id, other_id)
                    .map(|ancestor| graph.class(ancestor).name().to_string()),
            })
        }
        None => None,
    };

    let report = HierarchyReport {
        class: class.name().to_string(),
        origin: class.origin(),
        interface: class.is_interface(),
        depends_on_missing: class.is_tainted(),
        ancestors: names(class.parents()),
        descendants: names(class.children()),
        common_ancestor,
        diagnostics: diagnostic_entries(&diagnostics),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let kind = if report.interface { "interface" } else { "class" };
        println!("{kind} {} ({:?})", report.class, report.origin);
        if report.depends_on_missing {
            println!("  depends on missing classes");
        }
        println!("  ancestors: {}", report.ancestors.join(", "));
        println!("  descendants: {}", report.descendants.join(", "));
        if let Some(common) = &report.common_ancestor {
            println!(
                "  common ancestor with {}: {}",
                common.with,
                common.ancestor.as_deref().unwrap_or("(none)")
            );
        }
        print_diagnostics(&report.diagnostics);
    }

    Ok(0)
}
