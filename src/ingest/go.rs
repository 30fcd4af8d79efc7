//! Go-specific tree-sitter parsing logic.
//!
//! This module contains the tree-sitter-go integration: parsing a file,
//! extracting declaration records, and locating the byte span of one
//! declaration for the span mutator.

use crate::error::{GoSpliceError, Result};
use crate::symbol::{is_exported, DeclKind, Declaration};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// Byte interval bounding one declaration in a file's current bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based first line of the span.
    pub start_line: usize,
    /// 1-based last line of the span.
    pub end_line: usize,
}

impl DeclarationSpan {
    fn of(node: Node) -> Self {
        Self {
            start: node.start_byte(),
            end: node.end_byte(),
            start_line: node.start_position().row + 1,
            end_line: node.end_position().row + 1,
        }
    }

    /// Byte range of the span.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A declaration record paired with the span that an edit of it rewrites.
///
/// For grouped `type (...)`, `var (...)` and `const (...)` blocks the span is
/// the whole group. For fields it is the single field line.
#[derive(Debug, Clone)]
pub struct Located {
    /// The declaration record.
    pub decl: Declaration,
    /// The editable span.
    pub span: DeclarationSpan,
    /// Struct tag, for fields.
    pub tag: Option<String>,
}

/// A parsed Go source file.
pub struct GoFile {
    /// Path the source was read from.
    pub path: PathBuf,
    /// Raw file bytes.
    pub source: Vec<u8>,
    tree: Tree,
}

impl GoFile {
    /// Read and parse a file from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let source = std::fs::read(path).map_err(|e| GoSpliceError::io(path, e))?;
        Self::parse(path, source)
    }

    /// Parse in-memory bytes as if they were the contents of `path`.
    ///
    /// Fails with a parse error when tree-sitter reports any syntax error.
    pub fn parse(path: &Path, source: Vec<u8>) -> Result<Self> {
        std::str::from_utf8(&source)?;

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| GoSpliceError::Parse {
                file: path.to_path_buf(),
                message: format!("Failed to set Go language: {:?}", e),
            })?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| GoSpliceError::Parse {
                file: path.to_path_buf(),
                message: "Parse failed - no tree returned".to_string(),
            })?;

        if tree.root_node().has_error() {
            let message = match first_error(tree.root_node()) {
                Some(node) => format!(
                    "syntax error at {}:{}",
                    node.start_position().row + 1,
                    node.start_position().column + 1
                ),
                None => "syntax error".to_string(),
            };
            return Err(GoSpliceError::Parse {
                file: path.to_path_buf(),
                message,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }

    /// Root node of the syntax tree.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text of a byte range.
    pub fn text(&self, range: Range<usize>) -> &str {
        std::str::from_utf8(&self.source[range]).unwrap_or("")
    }

    /// Name from the `package` clause.
    pub fn package_name(&self) -> Option<String> {
        let root = self.root();
        let mut cursor = root.walk();
        let clause = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_clause")?;
        let mut inner = clause.walk();
        let ident = clause
            .named_children(&mut inner)
            .find(|n| n.kind() == "package_identifier")?;
        Some(node_text(ident, &self.source).to_string())
    }

    /// All declaration records in file order.
    pub fn declarations(&self) -> Vec<Declaration> {
        self.located().into_iter().map(|l| l.decl).collect()
    }

    /// All declarations with their editable spans, in file order.
    pub fn located(&self) -> Vec<Located> {
        let mut out = Vec::new();
        let root = self.root();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "function_declaration" | "method_declaration" => {
                    if let Some(entry) = self.function_entry(node) {
                        out.push(entry);
                    }
                }
                "type_declaration" => self.type_entries(node, &mut out),
                "var_declaration" => self.value_entries(node, DeclKind::Variable, &mut out),
                "const_declaration" => self.value_entries(node, DeclKind::Constant, &mut out),
                _ => {}
            }
        }
        out
    }

    /// First function or method answering to `name`.
    ///
    /// Accepts the bare method name, the receiver-qualified name as written
    /// (`*T.M`), and the pointer-stripped form (`T.M`).
    pub fn locate_function(&self, name: &str) -> Option<Located> {
        self.located().into_iter().find(|l| {
            matches!(l.decl.kind, DeclKind::Function | DeclKind::Method)
                && function_answers_to(&l.decl, name)
        })
    }

    /// First type declaration (or group) declaring `name`.
    pub fn locate_type(&self, name: &str) -> Option<Located> {
        self.located().into_iter().find(|l| {
            matches!(
                l.decl.kind,
                DeclKind::Struct | DeclKind::Interface | DeclKind::Alias
            ) && l.decl.name == name
        })
    }

    /// First `var`/`const` declaration (or group) declaring `name`.
    pub fn locate_value(&self, name: &str) -> Option<Located> {
        self.located().into_iter().find(|l| {
            matches!(l.decl.kind, DeclKind::Variable | DeclKind::Constant) && l.decl.name == name
        })
    }

    /// Struct field addressed as `Type.Field`.
    pub fn locate_field(&self, name: &str) -> Option<Located> {
        self.located()
            .into_iter()
            .find(|l| l.decl.kind == DeclKind::Field && l.decl.name == name)
    }

    fn record(&self, name: String, kind: DeclKind, ident: Node, end: Node) -> Declaration {
        let bare = node_text(ident, &self.source);
        Declaration {
            name,
            kind,
            file: self.path.clone(),
            line: ident.start_position().row + 1,
            column: ident.start_position().column + 1,
            end_line: end.end_position().row + 1,
            exported: is_exported(bare),
            signature: None,
            receiver: None,
            declared_type: None,
            value: None,
            parent: None,
        }
    }

    fn function_entry(&self, node: Node) -> Option<Located> {
        let ident = node.child_by_field_name("name")?;
        let bare = node_text(ident, &self.source);
        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|list| receiver_type(list, &self.source));

        let (kind, name) = match &receiver {
            Some(recv) => (DeclKind::Method, format!("{}.{}", recv, bare)),
            None => (DeclKind::Function, bare.to_string()),
        };

        let mut decl = self.record(name, kind, ident, node);
        decl.signature = Some(render_signature(node, &self.source, receiver.as_deref(), bare));
        decl.receiver = receiver;

        Some(Located {
            decl,
            span: DeclarationSpan::of(node),
            tag: None,
        })
    }

    fn type_entries(&self, node: Node, out: &mut Vec<Located>) {
        let span = DeclarationSpan::of(node);
        let mut cursor = node.walk();
        let specs: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "type_spec" || n.kind() == "type_alias")
            .collect();

        for spec in specs {
            let Some(ident) = spec.child_by_field_name("name") else {
                continue;
            };
            let shape = spec.child_by_field_name("type");
            let kind = match (spec.kind(), shape.map(|n| n.kind())) {
                ("type_spec", Some("struct_type")) => DeclKind::Struct,
                ("type_spec", Some("interface_type")) => DeclKind::Interface,
                _ => DeclKind::Alias,
            };

            let type_name = node_text(ident, &self.source).to_string();
            let mut decl = self.record(type_name.clone(), kind, ident, spec);
            if kind == DeclKind::Alias {
                decl.declared_type = shape.map(|n| collapse_whitespace(node_text(n, &self.source)));
            }
            out.push(Located {
                decl,
                span,
                tag: None,
            });

            if let (DeclKind::Struct, Some(shape)) = (kind, shape) {
                self.field_entries(&type_name, shape, out);
            }
        }
    }

    fn field_entries(&self, parent: &str, struct_type: Node, out: &mut Vec<Located>) {
        let mut cursor = struct_type.walk();
        let Some(list) = struct_type
            .named_children(&mut cursor)
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return;
        };

        let mut list_cursor = list.walk();
        let fields: Vec<Node> = list
            .named_children(&mut list_cursor)
            .filter(|n| n.kind() == "field_declaration")
            .collect();

        for field in fields {
            let declared_type = field
                .child_by_field_name("type")
                .map(|n| collapse_whitespace(node_text(n, &self.source)));
            let tag = field
                .child_by_field_name("tag")
                .map(|n| node_text(n, &self.source).to_string());

            // Embedded fields carry no name and produce no record.
            let mut name_cursor = field.walk();
            let idents: Vec<Node> = field
                .children_by_field_name("name", &mut name_cursor)
                .filter(|n| n.kind() == "field_identifier")
                .collect();

            for ident in idents {
                let name = format!("{}.{}", parent, node_text(ident, &self.source));
                let mut decl = self.record(name, DeclKind::Field, ident, field);
                decl.declared_type = declared_type.clone();
                decl.parent = Some(parent.to_string());
                out.push(Located {
                    decl,
                    span: DeclarationSpan::of(field),
                    tag: tag.clone(),
                });
            }
        }
    }

    fn value_entries(&self, node: Node, kind: DeclKind, out: &mut Vec<Located>) {
        let span = DeclarationSpan::of(node);
        for spec in value_specs(node) {
            let declared_type = spec
                .child_by_field_name("type")
                .map(|n| collapse_whitespace(node_text(n, &self.source)));

            let values: Vec<String> = match spec.child_by_field_name("value") {
                Some(list) => {
                    let mut cursor = list.walk();
                    list.named_children(&mut cursor)
                        .filter(|n| n.kind() != "comment")
                        .map(|n| collapse_whitespace(node_text(n, &self.source)))
                        .collect()
                }
                None => Vec::new(),
            };

            // const_spec tags its separating commas with the `name` field too.
            let mut cursor = spec.walk();
            let idents: Vec<Node> = spec
                .children_by_field_name("name", &mut cursor)
                .filter(|n| n.kind() == "identifier")
                .collect();

            for (i, ident) in idents.into_iter().enumerate() {
                let name = node_text(ident, &self.source).to_string();
                let mut decl = self.record(name, kind, ident, spec);
                decl.declared_type = declared_type.clone();
                decl.value = values.get(i).cloned();
                out.push(Located {
                    decl,
                    span,
                    tag: None,
                });
            }
        }
    }
}

/// `var_spec`/`const_spec` children of a declaration, flattening `var (...)` lists.
fn value_specs(node: Node) -> Vec<Node> {
    let mut specs = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "var_spec" | "const_spec" => specs.push(child),
            "var_spec_list" => {
                let mut inner = child.walk();
                specs.extend(
                    child
                        .named_children(&mut inner)
                        .filter(|n| n.kind() == "var_spec"),
                );
            }
            _ => {}
        }
    }
    specs
}

fn function_answers_to(decl: &Declaration, name: &str) -> bool {
    if decl.name == name || decl.bare_name() == name {
        return true;
    }
    match decl.receiver.as_deref().and_then(|r| r.strip_prefix('*')) {
        Some(base) => format!("{}.{}", base, decl.bare_name()) == name,
        None => false,
    }
}

/// Receiver type text as written, e.g. `*UserService`.
fn receiver_type(list: Node, source: &[u8]) -> Option<String> {
    let mut cursor = list.walk();
    let param = list
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    let ty = param.child_by_field_name("type")?;
    Some(collapse_whitespace(node_text(ty, source)))
}

/// `func (Recv) Name[T any](params) results`
fn render_signature(node: Node, source: &[u8], receiver: Option<&str>, name: &str) -> String {
    let mut sig = String::from("func ");
    if let Some(recv) = receiver {
        sig.push('(');
        sig.push_str(recv);
        sig.push_str(") ");
    }
    sig.push_str(name);
    if let Some(tp) = node.child_by_field_name("type_parameters") {
        sig.push_str(&collapse_whitespace(node_text(tp, source)));
    }
    match node.child_by_field_name("parameters") {
        Some(params) => sig.push_str(&collapse_whitespace(node_text(params, source))),
        None => sig.push_str("()"),
    }
    if let Some(result) = node.child_by_field_name("result") {
        sig.push(' ');
        sig.push_str(&collapse_whitespace(node_text(result, source)));
    }
    sig
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Source text of a node. Sources are validated as UTF-8 before parsing.
pub(crate) fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"package sample

const (
	Version = "2.0.0"
	Dip     = true
)

var GlobalConfig = map[string]string{}

var a, b int = 1

type User struct {
	ID   int    `json:"id"`
	Name string `json:"name"`
	io.Reader
}

type ID = int

type Reader interface {
	Read(p []byte) (int, error)
}

func (s *UserService) Create(name string) (*User, error) {
	return nil, nil
}

func helper() string {
	return "help"
}
"#;

    fn parse(src: &str) -> GoFile {
        GoFile::parse(Path::new("sample.go"), src.as_bytes().to_vec())
            .expect("fixture should parse")
    }

    #[test]
    fn test_extracts_every_kind_in_file_order() {
        let file = parse(SOURCE);
        let names: Vec<(String, DeclKind)> = file
            .declarations()
            .into_iter()
            .map(|d| (d.name, d.kind))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Version".to_string(), DeclKind::Constant),
                ("Dip".to_string(), DeclKind::Constant),
                ("GlobalConfig".to_string(), DeclKind::Variable),
                ("a".to_string(), DeclKind::Variable),
                ("b".to_string(), DeclKind::Variable),
                ("User".to_string(), DeclKind::Struct),
                ("User.ID".to_string(), DeclKind::Field),
                ("User.Name".to_string(), DeclKind::Field),
                ("ID".to_string(), DeclKind::Alias),
                ("Reader".to_string(), DeclKind::Interface),
                ("*UserService.Create".to_string(), DeclKind::Method),
                ("helper".to_string(), DeclKind::Function),
            ]
        );
    }

    #[test]
    fn test_value_without_initializer_has_no_value() {
        let file = parse(SOURCE);
        let decls = file.declarations();
        let a = decls.iter().find(|d| d.name == "a").expect("a");
        let b = decls.iter().find(|d| d.name == "b").expect("b");
        assert_eq!(a.value.as_deref(), Some("1"));
        assert_eq!(b.value, None);
        assert_eq!(b.declared_type.as_deref(), Some("int"));
    }

    #[test]
    fn test_method_metadata() {
        let file = parse(SOURCE);
        let located = file.locate_function("UserService.Create").expect("method");
        assert_eq!(located.decl.receiver.as_deref(), Some("*UserService"));
        assert_eq!(
            located.decl.signature.as_deref(),
            Some("func (*UserService) Create(name string) (*User, error)")
        );
        assert_eq!(located.decl.line, 24);
        assert_eq!(located.decl.column, 23);
        assert_eq!(located.decl.end_line, 26);
        assert!(file.text(located.span.range()).starts_with("func (s *UserService)"));
        assert!(file.text(located.span.range()).ends_with('}'));
    }

    #[test]
    fn test_grouped_const_span_covers_group() {
        let file = parse(SOURCE);
        let located = file.locate_value("Dip").expect("Dip");
        let text = file.text(located.span.range());
        assert!(text.starts_with("const ("));
        assert!(text.ends_with(')'));
        assert_eq!(located.decl.value.as_deref(), Some("true"));
    }

    #[test]
    fn test_field_tag_and_parent() {
        let file = parse(SOURCE);
        let located = file.locate_field("User.Name").expect("field");
        assert_eq!(located.decl.parent.as_deref(), Some("User"));
        assert_eq!(located.decl.declared_type.as_deref(), Some("string"));
        assert_eq!(located.tag.as_deref(), Some("`json:\"name\"`"));
    }

    #[test]
    fn test_package_name() {
        assert_eq!(parse(SOURCE).package_name().as_deref(), Some("sample"));
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let result = GoFile::parse(Path::new("bad.go"), b"package x\nfunc (\n".to_vec());
        assert!(matches!(result, Err(GoSpliceError::Parse { .. })));
    }
}
