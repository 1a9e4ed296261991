//! Function name resolution
//!
//! A name is looked up, in order, among functions registered at runtime,
//! the built-in table, expression plugin files `<plugin_dir>/<name>.fn`,
//! and finally parsed as an inline expression in `x`.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use riemann_ast::ExprError;
use riemann_core::{ErrorKind, TargetFunction};
use tracing::{debug, info};

use crate::builtin::builtin;
use crate::eval::CompiledExpression;

/// File extension of expression plugins
pub const PLUGIN_EXTENSION: &str = "fn";

/// Where the registry looks for plugin files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    pub plugin_dir: Option<PathBuf>,
}

impl RegistryConfig {
    /// Plugins are looked up next to the running executable
    #[must_use]
    pub fn beside_executable() -> Self {
        let plugin_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self { plugin_dir }
    }

    #[must_use]
    pub fn with_plugin_dir(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: Some(plugin_dir.into()),
        }
    }
}

/// Errors raised while resolving a function name
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("Dynamic loader: empty function name")]
    EmptyName,

    #[error("Dynamic loader: cannot read plugin {}", .path.display())]
    PluginRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Dynamic loader: invalid plugin {}", .path.display())]
    PluginSyntax {
        path: PathBuf,
        #[source]
        source: ExprError,
    },

    #[error("Dynamic loader: cannot resolve function '{name}'")]
    Unresolved {
        name: String,
        #[source]
        source: ExprError,
    },
}

impl ResolveError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::PluginLoad
    }
}

/// Which stage of the lookup produced a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionSource {
    Registered,
    Builtin,
    Plugin(PathBuf),
    Inline,
}

impl fmt::Display for FunctionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => f.write_str("registered"),
            Self::Builtin => f.write_str("builtin"),
            Self::Plugin(path) => write!(f, "plugin {}", path.display()),
            Self::Inline => f.write_str("inline expression"),
        }
    }
}

/// A resolved target function and where it came from
#[derive(Clone)]
pub struct Resolved {
    pub function: Arc<dyn TargetFunction>,
    pub source: FunctionSource,
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

pub struct FunctionRegistry {
    config: RegistryConfig,
    registered: HashMap<String, Arc<dyn TargetFunction>>,
}

impl FunctionRegistry {
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            registered: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register `function` under `name`, shadowing any built-in or plugin
    pub fn register(&mut self, name: impl Into<String>, function: impl TargetFunction + 'static) {
        self.registered.insert(name.into(), Arc::new(function));
    }

    /// Resolve `name` to a callable target function
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if no stage can produce a function: the name is
    /// empty, a matching plugin file cannot be read or parsed, or the name is
    /// not a valid inline expression
    pub fn resolve(&self, name: &str) -> Result<Resolved, ResolveError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ResolveError::EmptyName);
        }

        let resolved = self.lookup(name)?;
        info!(function = name, source = %resolved.source, "resolved target function");
        Ok(resolved)
    }

    fn lookup(&self, name: &str) -> Result<Resolved, ResolveError> {
        if let Some(function) = self.registered.get(name) {
            return Ok(Resolved {
                function: Arc::clone(function),
                source: FunctionSource::Registered,
            });
        }

        if let Some(function) = builtin(name) {
            return Ok(Resolved {
                function: Arc::new(function),
                source: FunctionSource::Builtin,
            });
        }

        if let Some(path) = self.plugin_path(name) {
            if path.is_file() {
                return Self::load_plugin(path);
            }
            debug!(path = %path.display(), "no plugin file");
        }

        let expression = CompiledExpression::compile(name, "<inline>").map_err(|source| {
            ResolveError::Unresolved {
                name: name.to_string(),
                source,
            }
        })?;
        Ok(Resolved {
            function: Arc::new(expression),
            source: FunctionSource::Inline,
        })
    }

    /// Plugin file for `name`, if a plugin directory is configured and
    /// `name` is a plain identifier
    fn plugin_path(&self, name: &str) -> Option<PathBuf> {
        let dir = self.config.plugin_dir.as_ref()?;
        is_identifier(name).then(|| dir.join(format!("{name}.{PLUGIN_EXTENSION}")))
    }

    fn load_plugin(path: PathBuf) -> Result<Resolved, ResolveError> {
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(source) => return Err(ResolveError::PluginRead { path, source }),
        };
        let filename = path.display().to_string();
        match CompiledExpression::compile(&source, &filename) {
            Ok(expression) => {
                debug!(plugin = %filename, expr = %expression.expr().node, "compiled plugin");
                Ok(Resolved {
                    function: Arc::new(expression),
                    source: FunctionSource::Plugin(path),
                })
            }
            Err(source) => Err(ResolveError::PluginSyntax { path, source }),
        }
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::beside_executable())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
