//! Export configuration resolved from environment variables or code.
//!
//! Like a runtime config, one struct captures every switch and is resolved
//! once before an export run; encoders read it without further lookups.

use std::path::PathBuf;
use tracing::debug;

/// Default directory for optimization pair dumps.
pub const DEFAULT_OPTIMIZATIONS_PATH: &str = "optimizations";

// =============================================================================
// Export Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Log why methods could not be translated (`VERIOPT_DEBUG`).
    pub debug: bool,

    /// Produce test-case documents (`VERIOPT_DUMP_TESTS`).
    pub dump_tests: bool,

    /// Encode float stamps instead of rejecting them (`VERIOPT_ENCODE_FLOAT_STAMPS`).
    pub encode_float_stamps: bool,

    /// Emit known-bit masks in integer stamps (`VERIOPT_ENCODE_INT_MASKS`).
    pub encode_int_masks: bool,

    /// Node allow-list file; empty allows every node (`VERIOPT_IRNODES`).
    pub irnodes_path: String,

    /// Pre-encode whole standard-library classes (`VERIOPT_USE_CLASS_HIERARCHY`).
    pub use_class_hierarchy: bool,

    /// Write before/after graphs of each optimization (`VERIOPT_DUMP_OPTIMIZATIONS`).
    pub dump_optimizations: bool,

    /// Directory for optimization dumps (`VERIOPT_DUMP_OPTIMIZATIONS_PATH`).
    pub dump_optimizations_path: PathBuf,

    /// Encode unmodelled node classes from their declared edges
    /// (`VERIOPT_DYNAMICALLY_TRANSLATE_ALL_NODES`).
    pub translate_all_dynamically: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            debug: false,
            dump_tests: false,
            encode_float_stamps: false,
            encode_int_masks: false,
            irnodes_path: String::new(),
            use_class_hierarchy: false,
            dump_optimizations: false,
            dump_optimizations_path: PathBuf::from(DEFAULT_OPTIMIZATIONS_PATH),
            translate_all_dynamically: false,
        }
    }
}

impl ExportConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Resolve from an arbitrary variable source.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| lookup(name).map(|v| is_truthy(&v)).unwrap_or(false);
        let defaults = Self::default();

        let config = Self {
            debug: flag("VERIOPT_DEBUG"),
            dump_tests: flag("VERIOPT_DUMP_TESTS"),
            encode_float_stamps: flag("VERIOPT_ENCODE_FLOAT_STAMPS"),
            encode_int_masks: flag("VERIOPT_ENCODE_INT_MASKS"),
            irnodes_path: lookup("VERIOPT_IRNODES").unwrap_or_default(),
            use_class_hierarchy: flag("VERIOPT_USE_CLASS_HIERARCHY"),
            dump_optimizations: flag("VERIOPT_DUMP_OPTIMIZATIONS"),
            dump_optimizations_path: lookup("VERIOPT_DUMP_OPTIMIZATIONS_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.dump_optimizations_path),
            translate_all_dynamically: flag("VERIOPT_DYNAMICALLY_TRANSLATE_ALL_NODES"),
        };
        debug!(?config, "resolved export configuration");
        config
    }

    pub fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    pub fn with_dump_tests(mut self, on: bool) -> Self {
        self.dump_tests = on;
        self
    }

    pub fn with_float_stamps(mut self, on: bool) -> Self {
        self.encode_float_stamps = on;
        self
    }

    pub fn with_int_masks(mut self, on: bool) -> Self {
        self.encode_int_masks = on;
        self
    }

    pub fn with_irnodes_path(mut self, path: impl Into<String>) -> Self {
        self.irnodes_path = path.into();
        self
    }

    pub fn with_class_hierarchy(mut self, on: bool) -> Self {
        self.use_class_hierarchy = on;
        self
    }

    pub fn with_dump_optimizations(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_optimizations = true;
        self.dump_optimizations_path = path.into();
        self
    }

    pub fn with_translate_all_dynamically(mut self, on: bool) -> Self {
        self.translate_all_dynamically = on;
        self
    }
}

/// A variable is true when set to something other than empty, `0` or `false`.
#[inline]
fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

// =============================================================================
// Node Allow-List
// =============================================================================

/// Node classes permitted in an export run.
///
/// A class is allowed when its simple name occurs anywhere in the list text
/// (case-sensitive), so the file may be any format that mentions names.
/// Empty text allows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    text: String,
}

impl AllowList {
    /// Allow every node class.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Load from `path`. An empty path or an unreadable file allows everything.
    pub fn load(path: &str) -> Self {
        if path.is_empty() {
            return Self::allow_all();
        }
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_text(text),
            Err(err) => {
                debug!(path, %err, "node allow-list unreadable, allowing all nodes");
                Self::allow_all()
            }
        }
    }

    pub fn allows_everything(&self) -> bool {
        self.text.is_empty()
    }

    pub fn allows(&self, simple_name: &str) -> bool {
        self.allows_everything() || self.text.contains(simple_name)
    }
}

// =============================================================================
// Tests
// =============================================================================
