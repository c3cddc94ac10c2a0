use std::sync::Arc;

use veil_classfile::ClassStub;
use veil_hierarchy::{
    build_hierarchy, member_families, BuildOptions, Diagnostics, HierarchyMode, MemberKind,
    ProviderChain, StubSet, SymbolGraph, SymbolProvider,
};

use crate::apply::apply_mapping;
use crate::error::{RemapError, Result};
use crate::keep::KeepRules;
use crate::mapping::NameMapping;
use crate::names::NameGenerator;
use crate::planner::RenamePlanner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapOptions {
    pub rename_classes: bool,
    pub rename_fields: bool,
    pub rename_methods: bool,
    /// Let members with different descriptors share one name in a class.
    pub share_overloads: bool,
    /// Move every renamed top-level class into this package (`""` for the
    /// default package) instead of keeping its own.
    pub flatten_package: Option<String>,
    /// Keep `public static void main(String[])`.
    pub keep_main: bool,
    /// Scan member edges on the rayon pool.
    pub parallel: bool,
}

impl Default for RemapOptions {
    fn default() -> Self {
        Self {
            rename_classes: true,
            rename_fields: true,
            rename_methods: true,
            share_overloads: false,
            flatten_package: None,
            keep_main: true,
            parallel: true,
        }
    }
}

/// Hooks called at fixed points of [`remap`].
pub trait PipelineObserver {
    /// After each hierarchy build: once for the class-only graph used to plan
    /// class names, once for the full member graph.
    fn after_class_build(&mut self, graph: &SymbolGraph) {
        let _ = graph;
    }

    /// After every class and member name has been planned.
    fn after_plan(&mut self, mapping: &NameMapping) {
        let _ = mapping;
    }

    /// Right before the program is rewritten.
    fn before_apply(&mut self, mapping: &NameMapping, program: &[ClassStub]) {
        let _ = (mapping, program);
    }
}

/// Everything one remapping run needs.
pub struct RemapContext {
    program: Arc<StubSet>,
    providers: ProviderChain,
    generator: Box<dyn NameGenerator>,
    options: RemapOptions,
    keep: KeepRules,
    diagnostics: Diagnostics,
    observers: Vec<Box<dyn PipelineObserver>>,
}

impl RemapContext {
    pub fn new(program: StubSet, generator: impl NameGenerator + 'static) -> Self {
        let program = Arc::new(program);
        Self {
            providers: ProviderChain::new(Arc::clone(&program)),
            program,
            generator: Box::new(generator),
            options: RemapOptions::default(),
            keep: KeepRules::default(),
            diagnostics: Diagnostics::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_library(mut self, library: impl SymbolProvider + 'static) -> Self {
        self.providers = self.providers.with_library(library);
        self
    }

    pub fn with_platform(mut self, platform: impl SymbolProvider + 'static) -> Self {
        self.providers = self.providers.with_platform(platform);
        self
    }

    pub fn with_options(mut self, options: RemapOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_keep_rules(mut self, keep: KeepRules) -> Self {
        self.keep = keep;
        self
    }

    pub fn with_observer(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn options(&self) -> &RemapOptions {
        &self.options
    }

    pub fn providers(&self) -> &ProviderChain {
        &self.providers
    }

    fn build(&mut self, mode: HierarchyMode) -> SymbolGraph {
        let graph = build_hierarchy(
            &self.providers,
            self.program.names(),
            BuildOptions {
                mode,
                parallel: self.options.parallel,
            },
            &mut self.diagnostics,
        );
        for observer in &mut self.observers {
            observer.after_class_build(&graph);
        }
        graph
    }
}

#[derive(Debug)]
pub struct RemapOutput {
    pub mapping: NameMapping,
    /// Rewritten program classes, in original internal-name order.
    pub program: Vec<ClassStub>,
    pub diagnostics: Diagnostics,
}

/// Plan and apply a rename of every program class and member.
///
/// Only an exhausted name generator or a malformed program class aborts the
/// run; everything else is reported through [`RemapOutput::diagnostics`].
pub fn remap(mut context: RemapContext) -> Result<RemapOutput> {
    for stub in context.program.stubs() {
        stub.validate().map_err(|source| RemapError::Malformed {
            class: stub.internal_name.clone(),
            source,
        })?;
    }

    let mut mapping = NameMapping::new();

    let class_graph = context.build(HierarchyMode::Fast);
    {
        let planner = RenamePlanner::new(&context.options, &context.keep);
        planner.plan_classes(
            &class_graph,
            &context.providers,
            context.generator.as_mut(),
            &mut context.diagnostics,
            &mut mapping,
        )?;
    }
    drop(class_graph);

    let graph = context.build(HierarchyMode::Full);
    let mut families = member_families(&graph, MemberKind::Field);
    families.extend(member_families(&graph, MemberKind::Method));
    let summary = RenamePlanner::new(&context.options, &context.keep).plan(
        &graph,
        &families,
        context.generator.as_mut(),
        &mut context.diagnostics,
        &mut mapping,
    )?;

    for observer in &mut context.observers {
        observer.after_plan(&mapping);
    }

    let program: Vec<ClassStub> = context.program.stubs().into_iter().cloned().collect();
    for observer in &mut context.observers {
        observer.before_apply(&mapping, &program);
    }
    let program = apply_mapping(&graph, &program, &mut mapping, &mut context.diagnostics)?;

    tracing::info!(
        target: "veil.remap",
        classes = program.len(),
        families = families.len(),
        renamed = summary.renamed,
        pinned = summary.pinned,
        skipped = summary.skipped,
        diagnostics = context.diagnostics.to_vec().len(),
        "remap finished"
    );

    Ok(RemapOutput {
        mapping,
        program,
        diagnostics: context.diagnostics,
    })
}
