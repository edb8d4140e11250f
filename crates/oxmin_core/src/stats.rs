//! Per-module size statistics recovered from minified output.
//!
//! Bundled files register their modules through a call such as
//! `meteorInstall({"node_modules":{"pkg":{"index.js":function(r,e,m){...}}}})`.
//! Walking that object literal tells us how many bytes each module and each
//! directory of modules contributes to the file.

use indexmap::IndexMap;
use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::{GetSpan, SourceType};
use serde::{Deserialize, Serialize};

/// Size contribution of one module id: a byte count, or a byte count plus
/// the breakdown of a nested group. Serializes as `123` or `[123, {...}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeNode {
    Leaf(u64),
    Group(u64, SizeTree),
}

pub type SizeTree = IndexMap<String, SizeNode>;

impl SizeNode {
    pub fn bytes(&self) -> u64 {
        match self {
            SizeNode::Leaf(bytes) | SizeNode::Group(bytes, _) => *bytes,
        }
    }

    /// Sum of the leaf byte counts below this node
    pub fn leaf_total(&self) -> u64 {
        match self {
            SizeNode::Leaf(bytes) => *bytes,
            SizeNode::Group(_, tree) => leaf_total(tree),
        }
    }
}

pub fn leaf_total(tree: &SizeTree) -> u64 {
    tree.values().map(SizeNode::leaf_total).sum()
}

fn merge_into(target: &mut SizeTree, other: SizeTree) {
    for (name, node) in other {
        let Some(existing) = target.get_mut(&name) else {
            target.insert(name, node);
            continue;
        };
        let merged = match (std::mem::replace(existing, SizeNode::Leaf(0)), node) {
            (SizeNode::Group(a, mut left), SizeNode::Group(b, right)) => {
                merge_into(&mut left, right);
                SizeNode::Group(a + b, left)
            }
            (left, right) => SizeNode::Leaf(left.leaf_total() + right.leaf_total()),
        };
        *existing = merged;
    }
}

/// Stats payload attached to an emitted file, keyed by its bundle path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileStats(pub IndexMap<String, SizeNode>);

impl FileStats {
    /// `{path: [len, tree]}` when a tree was recovered, otherwise `{path: len}`.
    pub fn for_file(path: &str, code: &str, tree: Option<SizeTree>) -> Self {
        let len = code.len() as u64;
        let node = match tree {
            Some(tree) => SizeNode::Group(len, tree),
            None => SizeNode::Leaf(len),
        };
        let mut entries = IndexMap::new();
        entries.insert(path.to_string(), node);
        Self(entries)
    }

    pub fn get(&self, path: &str) -> Option<&SizeNode> {
        self.0.get(path)
    }

    /// Folds another file's stats into this one.
    pub fn extend(&mut self, other: FileStats) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Recognizes one bundler's module registration convention.
pub trait ModuleRecognizer {
    /// Cheap textual test; `false` means the code cannot contain the pattern.
    fn might_match(&self, code: &str) -> bool;

    /// Builds the size tree from a parsed program, `None` if nothing matched.
    fn sizes<'a>(&self, program: &Program<'a>) -> Option<SizeTree>;
}

/// Handles `meteorInstall({...})` and `Package.modules.meteorInstall({...})`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeteorInstallRecognizer;

const METEOR_INSTALL: &str = "meteorInstall";

impl ModuleRecognizer for MeteorInstallRecognizer {
    fn might_match(&self, code: &str) -> bool {
        code.contains(METEOR_INSTALL)
    }

    fn sizes<'a>(&self, program: &Program<'a>) -> Option<SizeTree> {
        let mut finder = InstallCalls { tree: None, calls: 0 };
        finder.visit_program(program);
        trace!("Found {} module registration calls", finder.calls);
        finder.tree
    }
}

struct InstallCalls {
    tree: Option<SizeTree>,
    calls: usize,
}

impl<'a> Visit<'a> for InstallCalls {
    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        let is_install = match &it.callee {
            Expression::Identifier(ident) => ident.name.as_str() == METEOR_INSTALL,
            Expression::StaticMemberExpression(member) => {
                member.property.name.as_str() == METEOR_INSTALL
            }
            _ => false,
        };

        if is_install
            && let Some(Expression::ObjectExpression(obj)) =
                it.arguments.first().and_then(|arg| arg.as_expression())
        {
            self.calls += 1;
            let tree = module_tree(obj);
            match &mut self.tree {
                Some(existing) => merge_into(existing, tree),
                None => self.tree = Some(tree),
            }
            // Registrations inside module bodies are already counted in the outer sizes
            self.visit_expression(&it.callee);
            return;
        }

        walk::walk_call_expression(self, it);
    }
}

fn module_tree(obj: &ObjectExpression<'_>) -> SizeTree {
    let mut tree = SizeTree::new();
    for prop in &obj.properties {
        let ObjectPropertyKind::ObjectProperty(prop) = prop else {
            continue;
        };
        let Some(name) = prop.key.static_name() else {
            continue;
        };
        let bytes = u64::from(prop.value.span().size());
        let node = match &prop.value {
            Expression::ObjectExpression(inner) => SizeNode::Group(bytes, module_tree(inner)),
            _ => SizeNode::Leaf(bytes),
        };
        tree.insert(name.to_string(), node);
    }
    tree
}

/// Size tree of the modules registered in `code`, using the default recognizer.
pub fn extract_sizes(code: &str) -> Option<SizeTree> {
    extract_sizes_with(&MeteorInstallRecognizer, code)
}

/// Best effort: unparseable code or code without the registration pattern
/// yields `None`, never an error.
pub fn extract_sizes_with<R: ModuleRecognizer + ?Sized>(
    recognizer: &R,
    code: &str,
) -> Option<SizeTree> {
    if !recognizer.might_match(code) {
        trace!("No module registration marker, skipping size extraction");
        return None;
    }

    let script = SourceType::default().with_module(false);
    let module = SourceType::default().with_module(true);
    for st in [script, module] {
        let allocator = Allocator::default();
        let ParserReturn { program, errors, panicked, .. } =
            OxcParser::new(&allocator, code, st).parse();
        if panicked || !errors.is_empty() {
            trace!("Size extraction parse failed with {} errors", errors.len());
            continue;
        }
        let tree = recognizer.sizes(&program);
        debug!(
            "Extracted size tree with {} top-level entries",
            tree.as_ref().map_or(0, |t| t.len())
        );
        return tree;
    }

    debug!("Could not parse minified code for size extraction");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"var require=meteorInstall({"node_modules":{"meteor":{"a.js":function(e,t,n){n.exports=1}}},"client":{"main.js":function(e){console.log("hi")}}});"#;

    #[test]
    fn test_no_marker_returns_none() {
        assert_eq!(extract_sizes("var a=1;console.log(a);"), None);
        assert_eq!(extract_sizes(""), None);
    }

    #[test]
    fn test_marker_in_unparseable_code_returns_none() {
        assert_eq!(extract_sizes("meteorInstall({ ]"), None);
    }

    #[test]
    fn test_marker_without_call_returns_none() {
        assert_eq!(extract_sizes("var meteorInstall=Package.modules.meteorInstall;"), None);
    }

    #[test]
    fn test_nested_tree() {
        let tree = extract_sizes(BUNDLE).unwrap();
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["node_modules", "client"]);

        let SizeNode::Group(_, node_modules) = &tree["node_modules"] else {
            panic!("node_modules should be a group");
        };
        let SizeNode::Group(_, meteor) = &node_modules["meteor"] else {
            panic!("meteor should be a group");
        };
        let a = "function(e,t,n){n.exports=1}";
        assert_eq!(meteor["a.js"], SizeNode::Leaf(a.len() as u64));

        let SizeNode::Group(client_bytes, client) = &tree["client"] else {
            panic!("client should be a group");
        };
        let main = r#"function(e){console.log("hi")}"#;
        assert_eq!(client["main.js"], SizeNode::Leaf(main.len() as u64));
        assert_eq!(*client_bytes, format!(r#"{{"main.js":{}}}"#, main).len() as u64);
    }

    #[test]
    fn test_leaf_total_not_larger_than_code() {
        let tree = extract_sizes(BUNDLE).unwrap();
        assert!(leaf_total(&tree) <= BUNDLE.len() as u64);
        assert!(leaf_total(&tree) > 0);
    }

    #[test]
    fn test_nested_registration_is_not_counted_twice() {
        let code = r#"meteorInstall({"a.js":function(){meteorInstall({"b.js":function(){console.log("xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx")}})}});"#;
        let tree = extract_sizes(code).unwrap();
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["a.js"]);
        assert!(leaf_total(&tree) <= code.len() as u64);
    }

    #[test]
    fn test_member_callee_and_merge() {
        let code = r#"Package.modules.meteorInstall({"a":{"x.js":function(){1}}});meteorInstall({"a":{"y.js":function(){2}}});"#;
        let tree = extract_sizes(code).unwrap();
        assert_eq!(tree.len(), 1);
        let SizeNode::Group(_, a) = &tree["a"] else {
            panic!("a should be a group");
        };
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["x.js", "y.js"]);
    }

    #[test]
    fn test_module_syntax_is_parsed() {
        let code = r#"import"x";meteorInstall({"m.js":function(){}});export{};"#;
        let tree = extract_sizes(code).unwrap();
        assert_eq!(tree["m.js"], SizeNode::Leaf("function(){}".len() as u64));
    }

    #[test]
    fn test_file_stats_serialization() {
        let plain = FileStats::for_file("app/app.js", "abc", None);
        assert_eq!(serde_json::to_string(&plain).unwrap(), r#"{"app/app.js":3}"#);

        let mut tree = SizeTree::new();
        tree.insert("m.js".to_string(), SizeNode::Leaf(2));
        let nested = FileStats::for_file("app/app.js", "abcd", Some(tree));
        assert_eq!(serde_json::to_string(&nested).unwrap(), r#"{"app/app.js":[4,{"m.js":2}]}"#);
    }

    #[test]
    fn test_custom_recognizer() {
        struct Never;
        impl ModuleRecognizer for Never {
            fn might_match(&self, _code: &str) -> bool {
                true
            }
            fn sizes<'a>(&self, _program: &Program<'a>) -> Option<SizeTree> {
                None
            }
        }
        assert_eq!(extract_sizes_with(&Never, BUNDLE), None);
    }
}
