//! Statement dependency resolution
//!
//! Every statement of the main library is resolved depth-first. Each
//! referenced `(library, statement)` pair is resolved in turn and recorded as
//! a top-level entry of the result, so the map covers the transitive closure
//! of the main library's statements. Results are memoized per pair; the entry
//! is reserved before descending so reference cycles terminate.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use cqm_elm::Library;

use crate::alias::alias_to_library_name;
use crate::error::{ResolutionError, ResolutionResult};
use crate::node::collect_references;

/// Expression names provided by the evaluation context rather than a library
const BUILTIN_EXPRESSIONS: &[&str] = &["Patient"];

/// A `(library, statement)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatementReference {
    pub library_name: String,
    pub statement_name: String,
}

impl StatementReference {
    pub fn new(library_name: impl Into<String>, statement_name: impl Into<String>) -> Self {
        Self {
            library_name: library_name.into(),
            statement_name: statement_name.into(),
        }
    }
}

/// Statement name -> its direct dependencies, without duplicates
pub type StatementDependencies = IndexMap<String, Vec<StatementReference>>;

/// Library name -> statements resolved in that library
pub type DependencyMap = IndexMap<String, StatementDependencies>;

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Maximum reference nesting before resolution is aborted
    pub max_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

impl ResolverOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Memo of resolved statements, keyed by library then statement
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    map: DependencyMap,
}

impl ResolutionCache {
    pub fn contains(&self, library: &str, statement: &str) -> bool {
        self.map
            .get(library)
            .is_some_and(|statements| statements.contains_key(statement))
    }

    /// Reserve an empty entry ahead of resolving the statement's references
    fn reserve(&mut self, library: &str, statement: &str) {
        self.record(library, statement, Vec::new());
    }

    fn record(&mut self, library: &str, statement: &str, dependencies: Vec<StatementReference>) {
        self.map
            .entry(library.to_string())
            .or_default()
            .insert(statement.to_string(), dependencies);
    }

    pub fn len(&self) -> usize {
        self.map.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&mut self, library: &str) -> StatementDependencies {
        self.map.shift_remove(library).unwrap_or_default()
    }
}

/// Resolves statement dependencies over a fixed set of loaded libraries
#[derive(Debug)]
pub struct DependencyResolver<'a> {
    libraries: IndexMap<&'a str, &'a Library>,
    options: ResolverOptions,
    cache: ResolutionCache,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver; when two libraries share a name, the first is used
    pub fn new(libraries: &'a [Library]) -> Self {
        let mut by_name = IndexMap::with_capacity(libraries.len());
        for library in libraries {
            if by_name.contains_key(library.name()) {
                tracing::debug!(library = library.name(), "Ignoring duplicate library");
                continue;
            }
            by_name.insert(library.name(), library);
        }

        Self {
            libraries: by_name,
            options: ResolverOptions::default(),
            cache: ResolutionCache::default(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve every statement of `main`
    ///
    /// The result has one key per loaded library, in load order; libraries
    /// nothing references map to an empty dictionary.
    pub fn resolve(mut self, main: &str) -> ResolutionResult<DependencyMap> {
        let main_library = self.library(main)?;
        tracing::debug!(library = main, statements = main_library.statements().len(), "Resolving dependencies");

        for statement in main_library.statements() {
            self.resolve_statement(main_library, &statement.name, 0)?;
        }

        tracing::debug!(resolved = self.cache.len(), "Resolved statements");

        let names: Vec<&str> = self.libraries.keys().copied().collect();
        Ok(names
            .into_iter()
            .map(|name| (name.to_string(), self.cache.take(name)))
            .collect())
    }

    fn library(&self, name: &str) -> ResolutionResult<&'a Library> {
        self.libraries
            .get(name)
            .copied()
            .ok_or_else(|| ResolutionError::library_not_loaded(name))
    }

    fn resolve_statement(&mut self, library: &'a Library, name: &str, depth: usize) -> ResolutionResult<()> {
        if self.cache.contains(library.name(), name) {
            return Ok(());
        }
        if depth > self.options.max_depth {
            return Err(ResolutionError::MaxDepthExceeded {
                library: library.name().to_string(),
                statement: name.to_string(),
                max_depth: self.options.max_depth,
            });
        }

        let statement = library
            .statement(name)
            .ok_or_else(|| ResolutionError::statement_not_found(library.name(), name))?;
        self.cache.reserve(library.name(), name);

        let mut dependencies: Vec<StatementReference> = Vec::new();
        let mut targets: Vec<&'a Library> = Vec::new();
        for reference in collect_references(&statement.expression) {
            if reference.library_alias.is_none() && BUILTIN_EXPRESSIONS.contains(&reference.name.as_str()) {
                continue;
            }
            let library_name = alias_to_library_name(reference.library_alias.as_deref(), library)
                .map_err(|e| e.within_statement(name))?;
            let target = self.library(&library_name).map_err(|e| e.within_statement(name))?;

            let dependency = StatementReference::new(library_name, reference.name);
            if !dependencies.contains(&dependency) {
                dependencies.push(dependency);
                targets.push(target);
            }
        }

        self.cache.record(library.name(), name, dependencies.clone());

        for (dependency, target) in dependencies.iter().zip(targets) {
            self.resolve_statement(target, &dependency.statement_name, depth + 1)?;
        }
        Ok(())
    }
}

/// Resolve `main` against `libraries` with default options
pub fn resolve(main: &str, libraries: &[Library]) -> ResolutionResult<DependencyMap> {
    DependencyResolver::new(libraries).resolve(main)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureIssue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn expr_ref(name: &str) -> serde_json::Value {
        json!({"type": "ExpressionRef", "name": name})
    }

    #[test]
    fn test_duplicate_references_are_listed_once() {
        let main = Library::new("Main", Some("1"))
            .with_statement("A", json!({"type": "Or", "operand": [expr_ref("B"), expr_ref("B")]}))
            .with_statement("B", json!({"type": "Literal", "value": "true"}));

        let map = resolve("Main", &[main]).unwrap();

        assert_eq!(map["Main"]["A"], vec![StatementReference::new("Main", "B")]);
    }

    #[test]
    fn test_patient_context_is_ignored() {
        let main = Library::new("Main", Some("1"))
            .with_statement("Patient", json!({"type": "SingletonFrom"}))
            .with_statement("Age", json!({"type": "CalculateAge", "operand": expr_ref("Patient")}));

        let map = resolve("Main", &[main]).unwrap();

        assert!(map["Main"]["Age"].is_empty());
    }

    #[test]
    fn test_max_depth_guard() {
        let main = Library::new("Main", Some("1"))
            .with_statement("A", expr_ref("B"))
            .with_statement("B", expr_ref("C"))
            .with_statement("C", json!(null));
        let libraries = [main];

        let err = DependencyResolver::new(&libraries)
            .with_options(ResolverOptions::default().with_max_depth(1))
            .resolve("Main")
            .unwrap_err();

        assert!(matches!(err, ResolutionError::MaxDepthExceeded { max_depth: 1, .. }));
    }

    #[test]
    fn test_missing_statement_is_unexpected_structure() {
        let main = Library::new("Main", Some("1")).with_statement("A", expr_ref("Missing"));

        let err = resolve("Main", &[main]).unwrap_err();

        assert_eq!(err.issue(), Some(StructureIssue::StatementNotFound));
    }

    #[test]
    fn test_missing_main_library() {
        let err = resolve("Main", &[]).unwrap_err();

        assert_eq!(err.issue(), Some(StructureIssue::LibraryNotLoaded));
    }
}
