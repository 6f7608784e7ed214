// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle dispatch.
//!
//! [`PluginHost`] is built once per run from the discovered registry and a
//! module loader. The CLI calls the four phase methods in order; each call
//! walks the plugins in load order, resolves their config module (once per
//! run), and invokes the phase hook if the module has one.
//!
//! A failing hook never stops the walk: its error or panic is reported, the
//! argument it was handed is rolled back to what it was before the call,
//! and the next plugin runs.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use scriv_core::{CommandLineOptions, Document, Phase, ScrivError, SharedConfig, LOG_PLUGIN_LOADING_ENV};
use tracing::{debug, info, warn};

use crate::loader::{panic_message, HookError, HookResult, ModuleLoader, PluginHooks, Resolution};
use crate::registry::PluginRegistry;
use crate::resolver::{resolve_config_module, ConfigConventions};
use crate::source::RegistrationSource;

/// Whether `SCRIV_LOG_PLUGIN_LOADING` asks for verbose hook output.
pub fn verbose_loading_requested() -> bool {
    std::env::var_os(LOG_PLUGIN_LOADING_ENV).is_some()
}

/// One phase invocation together with the arguments that phase receives.
pub enum PhaseCall<'a> {
    AddConfig {
        config: &'a mut SharedConfig,
    },
    UpdateCommandLineOptions {
        options: &'a mut CommandLineOptions,
    },
    UpdateConfig {
        config: &'a mut SharedConfig,
        source_file: &'a Path,
    },
    InitPlugin {
        config: &'a mut SharedConfig,
        source_file: &'a Path,
        input: &'a mut dyn BufRead,
        document: &'a mut Document,
    },
}

impl PhaseCall<'_> {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseCall::AddConfig { .. } => Phase::AddConfig,
            PhaseCall::UpdateCommandLineOptions { .. } => Phase::UpdateCommandLineOptions,
            PhaseCall::UpdateConfig { .. } => Phase::UpdateConfig,
            PhaseCall::InitPlugin { .. } => Phase::InitPlugin,
        }
    }
}

/// What happened to each plugin during one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub phase: Phase,
    /// Plugins whose hook ran to completion.
    pub invoked: Vec<String>,
    /// Plugins whose hook failed or whose module could not be loaded.
    pub failed: Vec<String>,
    /// Plugins without a config module or without a hook for this phase.
    pub skipped: Vec<String>,
}

impl DispatchReport {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            invoked: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// True when no plugin failed in this phase.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A hook that did not complete.
#[derive(Debug)]
enum HookFailure {
    Error(HookError),
    Panic(String),
}

impl HookFailure {
    /// The last link of the error chain, or the panic message.
    fn cause(&self) -> String {
        match self {
            HookFailure::Error(err) => innermost_cause(err.as_ref()),
            HookFailure::Panic(message) => format!("panicked: {message}"),
        }
    }
}

fn innermost_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

/// Run `f` on `target`, restoring `target` if `f` fails or panics.
fn guarded<T: Clone>(target: &mut T, f: impl FnOnce(&mut T) -> HookResult) -> Result<(), HookFailure> {
    let snapshot = target.clone();
    let failure = match catch_unwind(AssertUnwindSafe(|| f(target))) {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(err)) => HookFailure::Error(err),
        Err(payload) => HookFailure::Panic(panic_message(payload.as_ref())),
    };
    *target = snapshot;
    Err(failure)
}

/// Invoke the hook for `call`'s phase. The caller has checked it exists.
fn invoke(hooks: &PluginHooks, call: &mut PhaseCall<'_>) -> Result<(), HookFailure> {
    match call {
        PhaseCall::AddConfig { config } => match &hooks.add_config {
            Some(hook) => guarded(&mut **config, |c| hook(c)),
            None => Ok(()),
        },
        PhaseCall::UpdateCommandLineOptions { options } => {
            match &hooks.update_command_line_options {
                Some(hook) => guarded(&mut **options, |o| hook(o)),
                None => Ok(()),
            }
        }
        PhaseCall::UpdateConfig {
            config,
            source_file,
        } => match &hooks.update_config {
            Some(hook) => guarded(&mut **config, |c| hook(c, *source_file)),
            None => Ok(()),
        },
        PhaseCall::InitPlugin {
            config,
            source_file,
            input,
            document,
        } => {
            let Some(hook) = &hooks.init_plugin else {
                return Ok(());
            };
            // Two targets to protect; bytes already read from `input` are
            // not restorable.
            let saved = ((**config).clone(), (**document).clone());
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                hook(&mut **config, *source_file, &mut **input, &mut **document)
            }));
            let failure = match outcome {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(err)) => HookFailure::Error(err),
                Err(payload) => HookFailure::Panic(panic_message(payload.as_ref())),
            };
            **config = saved.0;
            **document = saved.1;
            Err(failure)
        }
    }
}

/// Per-run plugin orchestrator.
pub struct PluginHost {
    registry: PluginRegistry,
    loader: Box<dyn ModuleLoader>,
    conventions: ConfigConventions,
    verbose: bool,
    resolutions: HashMap<String, Resolution>,
    output: Box<dyn Write>,
    last_phase: Option<Phase>,
}

impl std::fmt::Debug for PluginHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHost")
            .field("plugins", &self.registry.ordered_names())
            .field("conventions", &self.conventions)
            .field("verbose", &self.verbose)
            .field("last_phase", &self.last_phase)
            .finish()
    }
}

impl PluginHost {
    /// Create a host over an already-built registry.
    ///
    /// Diagnostics go to stdout unless [`with_output`](Self::with_output)
    /// redirects them.
    pub fn new(registry: PluginRegistry, loader: impl ModuleLoader + 'static) -> Self {
        Self {
            registry,
            loader: Box::new(loader),
            conventions: ConfigConventions::default(),
            verbose: false,
            resolutions: HashMap::new(),
            output: Box::new(std::io::stdout()),
            last_phase: None,
        }
    }

    /// Discover the plugins registered under `group` and build a host.
    ///
    /// Discovery failures are fatal and returned as-is.
    pub fn discover(
        source: &dyn RegistrationSource,
        group: &str,
        loader: impl ModuleLoader + 'static,
    ) -> Result<Self, ScrivError> {
        let registry = PluginRegistry::discover(source, group)?;
        info!(group, count = registry.len(), "discovered plugins");
        Ok(Self::new(registry, loader))
    }

    pub fn with_conventions(mut self, conventions: ConfigConventions) -> Self {
        self.conventions = conventions;
        self.resolutions.clear();
        self
    }

    /// Print `Running <phase> from: <module>` for every invocation.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Redirect diagnostic output.
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Plugin names in load order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.registry.ordered_names()
    }

    /// Resolve a plugin's config module, caching the outcome for the run.
    ///
    /// `phase` is the phase that needs the module; a load failure is
    /// reported, with that phase, the first time it is seen.
    pub fn resolve(&mut self, name: &str, phase: Phase) -> &Resolution {
        if !self.resolutions.contains_key(name) {
            let resolution = self.resolve_uncached(name, phase);
            self.resolutions.insert(name.to_string(), resolution);
        }
        &self.resolutions[name]
    }

    fn resolve_uncached(&mut self, name: &str, phase: Phase) -> Resolution {
        let Some(plugin) = self.registry.get(name) else {
            return Resolution::Absent;
        };
        let Some(module) = resolve_config_module(&plugin.files, &self.conventions) else {
            debug!(plugin = %name, "no config module in distribution");
            return Resolution::Absent;
        };

        match self.loader.load(&module) {
            Ok(hooks) => {
                debug!(plugin = %name, module = %module, %phase, ?hooks, "loaded config module");
                Resolution::Found { module, hooks }
            }
            Err(error) => {
                warn!(
                    plugin = %name,
                    module = %module,
                    %phase,
                    %error,
                    "failed to load config module"
                );
                self.emit(format_args!(
                    "Failed to load {module}:\n  {}\n  ignoring plugin\n",
                    innermost_cause(&error)
                ));
                Resolution::Failed {
                    module,
                    error: error.into(),
                }
            }
        }
    }

    /// Run `addConfig(config)` on every plugin.
    pub fn add_config(&mut self, config: &mut SharedConfig) -> DispatchReport {
        self.dispatch(PhaseCall::AddConfig { config })
    }

    /// Run `updateCommandLineOptions(options)` on every plugin.
    pub fn update_command_line_options(&mut self, options: &mut CommandLineOptions) -> DispatchReport {
        self.dispatch(PhaseCall::UpdateCommandLineOptions { options })
    }

    /// Run `updateConfig(config, source_file)` on every plugin.
    pub fn update_config(&mut self, config: &mut SharedConfig, source_file: &Path) -> DispatchReport {
        self.dispatch(PhaseCall::UpdateConfig {
            config,
            source_file,
        })
    }

    /// Run `initPlugin(config, source_file, input, document)` on every plugin.
    pub fn init_plugin(
        &mut self,
        config: &mut SharedConfig,
        source_file: &Path,
        input: &mut dyn BufRead,
        document: &mut Document,
    ) -> DispatchReport {
        self.dispatch(PhaseCall::InitPlugin {
            config,
            source_file,
            input,
            document,
        })
    }

    /// Invoke one phase on every plugin, in load order.
    ///
    /// Never fails: per-plugin failures are reported and recorded in the
    /// returned report.
    pub fn dispatch(&mut self, mut call: PhaseCall<'_>) -> DispatchReport {
        let phase = call.phase();
        self.track_phase(phase);

        let mut report = DispatchReport::new(phase);
        for name in self.registry.ordered_names() {
            let (module, hooks) = match self.resolve(&name, phase) {
                Resolution::Found { module, hooks } => (module.clone(), hooks.clone()),
                Resolution::Absent => {
                    report.skipped.push(name);
                    continue;
                }
                Resolution::Failed { module, .. } => {
                    debug!(plugin = %name, module = %module, %phase, "skipping plugin that failed to load");
                    report.failed.push(name);
                    continue;
                }
            };

            if !hooks.implements(phase) {
                report.skipped.push(name);
                continue;
            }

            if phase.is_critical() {
                info!(plugin = %name, %phase, module = %module, "Running {phase} from: {module}");
            } else {
                debug!(plugin = %name, %phase, module = %module, "Running {phase} from: {module}");
            }
            if self.verbose {
                self.emit(format_args!("Running {phase} from: {module}\n"));
            }

            match invoke(&hooks, &mut call) {
                Ok(()) => report.invoked.push(name),
                Err(failure) => {
                    let cause = failure.cause();
                    warn!(plugin = %name, %phase, module = %module, error = %cause, "plugin hook failed");
                    self.emit(format_args!(
                        "Failed to run {phase} from {module}:\n  {cause}\n  ignoring plugin\n"
                    ));
                    report.failed.push(name);
                }
            }
        }
        report
    }

    fn track_phase(&mut self, phase: Phase) {
        if let Some(last) = self.last_phase
            && phase < last
        {
            warn!(%phase, after = %last, "lifecycle phase dispatched out of order");
            return;
        }
        self.last_phase = Some(phase);
    }

    fn emit(&mut self, text: std::fmt::Arguments<'_>) {
        if let Err(e) = self.output.write_fmt(text).and_then(|()| self.output.flush()) {
            debug!(error = %e, "failed to write plugin diagnostics");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use super::*;
    use crate::loader::ModuleCatalog;
    use crate::source::PluginRegistration;
    use tracing_test::traced_test;

    #[derive(Clone, Default)]
    struct Buf(Rc<RefCell<Vec<u8>>>);

    impl Write for Buf {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(data);
            Ok(data.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buf {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn registry(plugins: &[(&str, &str)]) -> PluginRegistry {
        PluginRegistry::from_registrations(
            plugins
                .iter()
                .map(|(value, file)| PluginRegistration::new(*value, *value, vec![PathBuf::from(*file)]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn failed_hook_rolls_back_partial_changes() {
        let catalog = ModuleCatalog::new().with("bad.ConfigScrivPlugin", || {
            Ok(PluginHooks::new().on_add_config(|c| {
                c.set("bad.half_written", true);
                c.set("html.theme", "broken");
                Err("second key rejected".into())
            }))
        });
        let buf = Buf::default();
        let mut host = PluginHost::new(registry(&[("bad", "bad/ConfigScrivPlugin.rs")]), catalog)
            .with_output(buf.clone());

        let mut config = SharedConfig::new();
        config.set("html.theme", "default");
        let report = host.add_config(&mut config);

        assert_eq!(report.failed, vec!["bad"]);
        assert!(!config.contains("bad.half_written"));
        assert_eq!(config.get_str("html.theme"), Some("default"));
        assert!(buf.text().contains("second key rejected"));
    }

    #[test]
    fn panicking_hook_is_isolated_and_rolled_back() {
        let catalog = ModuleCatalog::new()
            .with("a.ConfigScrivPlugin", || {
                Ok(PluginHooks::new().on_update_command_line_options(|o| {
                    o.set("a.touched", true);
                    panic!("option hook blew up")
                }))
            })
            .with("b.ConfigScrivPlugin", || {
                Ok(PluginHooks::new().on_update_command_line_options(|o| {
                    o.set("b.touched", true);
                    Ok(())
                }))
            });
        let buf = Buf::default();
        let mut host = PluginHost::new(
            registry(&[("a", "a/ConfigScrivPlugin.rs"), ("b", "b/ConfigScrivPlugin.rs")]),
            catalog,
        )
        .with_output(buf.clone());

        let mut options = CommandLineOptions::new();
        let report = host.update_command_line_options(&mut options);

        assert_eq!(report.failed, vec!["a"]);
        assert_eq!(report.invoked, vec!["b"]);
        assert!(!options.contains("a.touched"));
        assert!(options.contains("b.touched"));
        assert!(buf.text().contains("panicked: option hook blew up"));
    }

    #[test]
    fn init_plugin_rolls_back_document_on_failure() {
        let catalog = ModuleCatalog::new().with("d.ConfigScrivPlugin", || {
            Ok(PluginHooks::new().on_init_plugin(|_, _, input, doc| {
                let mut first = String::new();
                input.read_line(&mut first)?;
                doc.userdata_mut().insert("first_line".into(), first.trim().into());
                Err("cannot finish setup".into())
            }))
        });
        let mut host = PluginHost::new(registry(&[("d", "d/ConfigScrivPlugin.rs")]), catalog)
            .with_output(Buf::default());

        let mut config = SharedConfig::new();
        let mut document = Document::new("paper.tex");
        let mut input = std::io::Cursor::new(b"\\documentclass{article}\n".to_vec());
        let report = host.init_plugin(&mut config, Path::new("paper.tex"), &mut input, &mut document);

        assert_eq!(report.failed, vec!["d"]);
        assert!(document.userdata().is_empty());
    }

    #[test]
    fn load_failure_is_reported_once_and_cached() {
        let buf = Buf::default();
        let mut host = PluginHost::new(
            registry(&[("ghost", "ghost/ConfigScrivPlugin.rs")]),
            ModuleCatalog::new(),
        )
        .with_output(buf.clone());

        let mut config = SharedConfig::new();
        let first = host.add_config(&mut config);
        let second = host.update_config(&mut config, Path::new("paper.tex"));

        assert_eq!(first.failed, vec!["ghost"]);
        assert_eq!(second.failed, vec!["ghost"]);
        assert_eq!(buf.text().matches("Failed to load ghost.ConfigScrivPlugin:").count(), 1);
        assert!(matches!(host.resolve("ghost", Phase::InitPlugin), Resolution::Failed { .. }));
    }

    #[test]
    fn factory_runs_once_per_run() {
        let loads = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = loads.clone();
        let catalog = ModuleCatalog::new().with("once.ConfigScrivPlugin", move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(PluginHooks::new()
                .on_add_config(|_| Ok(()))
                .on_update_config(|_, _| Ok(())))
        });
        let mut host = PluginHost::new(registry(&[("once", "once/ConfigScrivPlugin.rs")]), catalog)
            .with_output(Buf::default());

        let mut config = SharedConfig::new();
        host.add_config(&mut config);
        host.update_config(&mut config, Path::new("x.tex"));
        assert_eq!(loads.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn verbose_mode_prints_each_invocation() {
        let catalog = ModuleCatalog::new().with("v.renderers.V.Config", || {
            Ok(PluginHooks::new().on_add_config(|_| Ok(())))
        });
        let buf = Buf::default();
        let mut host = PluginHost::new(registry(&[("v", "v/renderers/V/Config.rs")]), catalog)
            .with_verbose(true)
            .with_output(buf.clone());

        host.add_config(&mut SharedConfig::new());
        assert_eq!(buf.text(), "Running addConfig from: v.renderers.V.Config\n");
    }

    #[test]
    fn quiet_mode_prints_nothing_on_success() {
        let catalog = ModuleCatalog::new().with("q.ConfigScrivPlugin", || {
            Ok(PluginHooks::new().on_add_config(|_| Ok(())))
        });
        let buf = Buf::default();
        let mut host = PluginHost::new(registry(&[("q", "q/ConfigScrivPlugin.rs")]), catalog)
            .with_output(buf.clone());

        let report = host.add_config(&mut SharedConfig::new());
        assert_eq!(report.invoked, vec!["q"]);
        assert!(buf.text().is_empty());
    }

    #[test]
    fn nested_error_reports_innermost_cause() {
        #[derive(Debug)]
        struct Outer(std::io::Error);
        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "could not read theme")
            }
        }
        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let catalog = ModuleCatalog::new().with("n.ConfigScrivPlugin", || {
            Ok(PluginHooks::new().on_add_config(|_| {
                Err(Outer(std::io::Error::other("theme.css: permission denied")).into())
            }))
        });
        let buf = Buf::default();
        let mut host = PluginHost::new(registry(&[("n", "n/ConfigScrivPlugin.rs")]), catalog)
            .with_output(buf.clone());

        host.add_config(&mut SharedConfig::new());
        assert_eq!(
            buf.text(),
            "Failed to run addConfig from n.ConfigScrivPlugin:\n  theme.css: permission denied\n  ignoring plugin\n"
        );
    }

    #[test]
    #[traced_test]
    fn out_of_order_phase_is_warned() {
        let mut host = PluginHost::new(PluginRegistry::default(), ModuleCatalog::new())
            .with_output(Buf::default());
        let mut config = SharedConfig::new();
        host.update_config(&mut config, Path::new("x.tex"));
        host.add_config(&mut config);
        assert!(logs_contain("lifecycle phase dispatched out of order"));
    }

    #[test]
    #[traced_test]
    fn load_failure_log_names_module_and_phase() {
        let mut host = PluginHost::new(
            registry(&[("ghost", "ghost/ConfigScrivPlugin.rs")]),
            ModuleCatalog::new(),
        )
        .with_output(Buf::default());
        host.update_config(&mut SharedConfig::new(), Path::new("x.tex"));
        assert!(logs_contain("failed to load config module"));
        assert!(logs_contain("module=ghost.ConfigScrivPlugin"));
        assert!(logs_contain("phase=updateConfig"));
    }

    #[test]
    #[traced_test]
    fn critical_phases_log_at_info() {
        let catalog = ModuleCatalog::new().with("c.ConfigScrivPlugin", || {
            Ok(PluginHooks::new().on_update_config(|_, _| Ok(())))
        });
        let mut host = PluginHost::new(registry(&[("c", "c/ConfigScrivPlugin.rs")]), catalog)
            .with_output(Buf::default());
        host.update_config(&mut SharedConfig::new(), Path::new("x.tex"));
        assert!(logs_contain("Running updateConfig from: c.ConfigScrivPlugin"));
    }

    #[test]
    #[serial_test::serial]
    fn env_toggle_is_detected() {
        // SAFETY: serialized with the other env-mutating tests.
        unsafe { std::env::set_var(LOG_PLUGIN_LOADING_ENV, "1") };
        assert!(verbose_loading_requested());
        unsafe { std::env::remove_var(LOG_PLUGIN_LOADING_ENV) };
        assert!(!verbose_loading_requested());
    }
}
