use crate::model::{DocLines, Enum, EnumLiteral, Field, Interface, Operation, ParsedSources, Struct};
use anyhow::{Context, Result};
use log::{debug, warn};
use quote::ToTokens;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Parser for the Rust sources of one generation unit.
///
/// Parsing happens in two steps: [`AstParser::parse_files`] turns files into `syn`
/// syntax trees, then [`AstParser::extract`] turns the trees into the
/// [`ParsedSources`] model the generators work on.
///
/// # Example
///
/// ```no_run
/// use annotation_codegen::parser::AstParser;
/// use std::path::PathBuf;
///
/// let results = AstParser::parse_files(&[PathBuf::from("src/orders/order.rs")]);
/// let parsed: Vec<_> = results.into_iter().filter_map(Result::ok).collect();
/// let sources = AstParser::extract(&parsed);
/// println!("Found {} structs", sources.structs.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl ParsedFile {
    /// Name of the directory holding the file; all entities of the file belong to it.
    pub fn package_name(&self) -> String {
        self.path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = syn::parse_file(&content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings and returned as `Err`.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| match Self::parse_file(path) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }

    /// Builds the intermediate model from parsed files.
    ///
    /// Top-level structs, enums and traits become entities. Methods of inherent
    /// `impl` blocks are attached to their struct, wherever the block is declared;
    /// blocks for unknown types are ignored. Trait impls are ignored.
    pub fn extract(files: &[ParsedFile]) -> ParsedSources {
        let mut sources = ParsedSources::default();
        let mut impl_methods: BTreeMap<String, Vec<Operation>> = BTreeMap::new();

        for file in files {
            let package_name = file.package_name();
            let filename = file.filename();

            for item in &file.syntax_tree.items {
                match item {
                    syn::Item::Struct(item) => sources.structs.push(Struct {
                        doc_lines: doc_lines(&item.attrs),
                        package_name: package_name.clone(),
                        filename: filename.clone(),
                        name: item.ident.to_string(),
                        fields: struct_fields(&item.fields),
                        operations: Vec::new(),
                    }),
                    syn::Item::Enum(item) => sources.enums.push(Enum {
                        doc_lines: doc_lines(&item.attrs),
                        package_name: package_name.clone(),
                        filename: filename.clone(),
                        name: item.ident.to_string(),
                        literals: item
                            .variants
                            .iter()
                            .map(|v| EnumLiteral {
                                doc_lines: doc_lines(&v.attrs),
                                name: v.ident.to_string(),
                                value: v
                                    .discriminant
                                    .as_ref()
                                    .map(|(_, expr)| compact(&expr.to_token_stream().to_string())),
                            })
                            .collect(),
                    }),
                    syn::Item::Trait(item) => {
                        let name = item.ident.to_string();
                        let methods = item
                            .items
                            .iter()
                            .filter_map(|i| match i {
                                syn::TraitItem::Fn(f) => Some(operation(&f.attrs, &f.sig, &package_name, &filename, &name)),
                                _ => None,
                            })
                            .collect();
                        sources.interfaces.push(Interface {
                            doc_lines: doc_lines(&item.attrs),
                            package_name: package_name.clone(),
                            filename: filename.clone(),
                            name,
                            methods,
                        });
                    }
                    syn::Item::Impl(item) if item.trait_.is_none() => {
                        let Some(owner) = self_type_name(&item.self_ty) else {
                            continue;
                        };
                        let methods = item.items.iter().filter_map(|i| match i {
                            syn::ImplItem::Fn(f) => Some(operation(&f.attrs, &f.sig, &package_name, &filename, &owner)),
                            _ => None,
                        });
                        impl_methods.entry(owner.clone()).or_default().extend(methods);
                    }
                    _ => {}
                }
            }
        }

        for (owner, methods) in impl_methods {
            match sources.structs.iter_mut().find(|s| s.name == owner) {
                Some(s) => s.operations.extend(methods),
                None => debug!("Ignoring {} method(s) of unknown type {}", methods.len(), owner),
            }
        }

        debug!(
            "Extracted {} structs, {} enums, {} traits",
            sources.structs.len(),
            sources.enums.len(),
            sources.interfaces.len()
        );
        sources
    }
}

/// Doc attributes rendered back as `///` comment lines.
fn doc_lines(attrs: &[syn::Attribute]) -> DocLines {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(syn::MetaNameValue {
                value:
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(s), ..
                    }),
                ..
            }) => Some(s.value()),
            _ => None,
        })
        .flat_map(|doc| doc.lines().map(|line| format!("///{}", line)).collect::<Vec<_>>())
        .collect()
}

fn struct_fields(fields: &syn::Fields) -> Vec<Field> {
    fields
        .iter()
        .enumerate()
        .map(|(index, f)| Field {
            doc_lines: doc_lines(&f.attrs),
            name: f
                .ident
                .as_ref()
                .map(|ident| ident.to_string())
                .unwrap_or_else(|| index.to_string()),
            type_name: type_name(&f.ty),
        })
        .collect()
}

fn operation(
    attrs: &[syn::Attribute],
    sig: &syn::Signature,
    package_name: &str,
    filename: &str,
    owner: &str,
) -> Operation {
    let input_args = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            syn::FnArg::Receiver(_) => None,
            syn::FnArg::Typed(pat_type) => Some(Field {
                doc_lines: Vec::new(),
                name: match pat_type.pat.as_ref() {
                    syn::Pat::Ident(pat) => pat.ident.to_string(),
                    other => compact(&other.to_token_stream().to_string()),
                },
                type_name: type_name(&pat_type.ty),
            }),
        })
        .collect();

    let (output, error) = match &sig.output {
        syn::ReturnType::Default => (None, None),
        syn::ReturnType::Type(_, ty) => split_result(ty),
    };

    Operation {
        doc_lines: doc_lines(attrs),
        package_name: package_name.to_string(),
        filename: filename.to_string(),
        name: sig.ident.to_string(),
        related_struct: Some(owner.to_string()),
        is_async: sig.asyncness.is_some(),
        input_args,
        output,
        error,
    }
}

/// `Result<T, E>` -> (`T`, `E`); `Result<T>` aliases carry an implied `Error`.
fn split_result(ty: &syn::Type) -> (Option<Field>, Option<Field>) {
    let unit_to_none = |ty: &syn::Type| match ty {
        syn::Type::Tuple(tuple) if tuple.elems.is_empty() => None,
        other => Some(Field::new("", type_name(other))),
    };

    if let syn::Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Result" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    let types: Vec<&syn::Type> = args
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            syn::GenericArgument::Type(ty) => Some(ty),
                            _ => None,
                        })
                        .collect();
                    match types.as_slice() {
                        [ok] => return (unit_to_none(ok), Some(Field::new("", "Error"))),
                        [ok, err] => return (unit_to_none(ok), Some(Field::new("", type_name(err)))),
                        _ => {}
                    }
                }
            }
        }
    }
    (unit_to_none(ty), None)
}

fn self_type_name(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

fn type_name(ty: &syn::Type) -> String {
    compact(&ty.to_token_stream().to_string())
}

/// Drops the token spacing of `TokenStream::to_string`, keeping a blank only
/// between two word characters: `& 'a mut Vec < String >` -> `&'a mut Vec<String>`.
fn compact(tokens: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut out = String::with_capacity(tokens.len());
    let mut pending_space = false;
    for c in tokens.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && out.chars().last().is_some_and(is_word) && is_word(c) {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let file_path = dir.join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn parse_in_package(package: &str, files: &[(&str, &str)]) -> ParsedSources {
        let temp_dir = TempDir::new().unwrap();
        let package_dir = temp_dir.path().join(package);
        fs::create_dir(&package_dir).unwrap();
        let paths: Vec<PathBuf> = files
            .iter()
            .map(|(name, content)| create_temp_file(&package_dir, name, content))
            .collect();
        let parsed: Vec<ParsedFile> = AstParser::parse_files(&paths).into_iter().map(Result::unwrap).collect();
        AstParser::extract(&parsed)
    }

    #[test]
    fn test_parse_invalid_rust_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(temp_dir.path(), "invalid.rs", "pub struct User { pub id: u32 pub name: String }");
        let result = AstParser::parse_file(&file_path);

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to parse Rust syntax"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let err_msg = AstParser::parse_file(Path::new("/nonexistent/file.rs"))
            .unwrap_err()
            .to_string();
        assert!(err_msg.contains("Failed to read file"));
    }

    #[test]
    fn test_parse_files_keeps_going() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_temp_file(temp_dir.path(), "good.rs", "pub struct World;");
        let bad = create_temp_file(temp_dir.path(), "bad.rs", "pub fn broken( {");

        let results = AstParser::parse_files(&[good.clone(), bad]);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().path, good);
        assert!(results[1].is_err());
    }

    #[test]
    fn test_extract_struct_with_doc_lines_and_fields() {
        let sources = parse_in_package(
            "orders",
            &[(
                "events.rs",
                r#"
                /// Emitted once per order.
                /// @Event( aggregate = "Order", isRootEvent = "true" )
                pub struct OrderCreated {
                    pub order_uid: String,
                    /// @Sensitive()
                    pub email: Option<String>,
                    pub lines: Vec<OrderLine>,
                }
                "#,
            )],
        );

        assert_eq!(sources.structs.len(), 1);
        let s = &sources.structs[0];
        assert_eq!(s.name, "OrderCreated");
        assert_eq!(s.package_name, "orders");
        assert_eq!(s.filename, "events.rs");
        assert_eq!(
            s.doc_lines,
            vec![
                "/// Emitted once per order.".to_string(),
                r#"/// @Event( aggregate = "Order", isRootEvent = "true" )"#.to_string(),
            ]
        );
        let types: Vec<(&str, &str)> = s
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.type_name.as_str()))
            .collect();
        assert_eq!(
            types,
            vec![
                ("order_uid", "String"),
                ("email", "Option<String>"),
                ("lines", "Vec<OrderLine>"),
            ]
        );
        assert_eq!(s.fields[1].doc_lines, vec!["/// @Sensitive()".to_string()]);
    }

    #[test]
    fn test_extract_attaches_impl_methods_across_files() {
        let sources = parse_in_package(
            "people",
            &[
                (
                    "service.rs",
                    r#"
                    impl PersonService {
                        /// @RestOperation( path = "/person/{uid}", method = "GET" )
                        pub async fn get_person(&self, ctx: &Context, uid: &str) -> Result<Person, ServiceError> {
                            todo!()
                        }

                        pub fn touch(&mut self, uid: &str) -> Result<(), ServiceError> {
                            todo!()
                        }

                        fn count(&self) -> usize {
                            0
                        }
                    }

                    impl Orphan {
                        fn ignored(&self) {}
                    }
                    "#,
                ),
                ("model.rs", "/// @RestService( path = \"/api\" )\npub struct PersonService;"),
            ],
        );

        assert_eq!(sources.structs.len(), 1);
        let ops = &sources.structs[0].operations;
        assert_eq!(ops.len(), 3);

        let get = &ops[0];
        assert_eq!(get.name, "get_person");
        assert!(get.is_async);
        assert_eq!(get.related_struct.as_deref(), Some("PersonService"));
        assert_eq!(get.filename, "service.rs");
        assert_eq!(get.input_args, vec![Field::new("ctx", "&Context"), Field::new("uid", "&str")]);
        assert_eq!(get.output, Some(Field::new("", "Person")));
        assert_eq!(get.error, Some(Field::new("", "ServiceError")));

        assert_eq!(ops[1].output, None);
        assert_eq!(ops[1].error, Some(Field::new("", "ServiceError")));

        assert_eq!(ops[2].output, Some(Field::new("", "usize")));
        assert_eq!(ops[2].error, None);
    }

    #[test]
    fn test_extract_enums_and_traits() {
        let sources = parse_in_package(
            "colors",
            &[(
                "color.rs",
                r#"
                /// @JsonEnum( base = "Color" )
                pub enum Color {
                    /// @Default
                    Red = 1,
                    Green,
                }

                /// @OutboundClient( description = "paint shop" )
                pub trait PaintClient {
                    fn mix(&self, colors: &[Color]) -> Color;
                    const LIMIT: usize;
                }

                impl Default for Color {
                    fn default() -> Self {
                        Color::Green
                    }
                }
                "#,
            )],
        );

        let color = &sources.enums[0];
        assert_eq!(color.package_name, "colors");
        assert_eq!(color.literals.len(), 2);
        assert_eq!(color.literals[0].value.as_deref(), Some("1"));
        assert_eq!(color.literals[0].doc_lines, vec!["/// @Default".to_string()]);
        assert_eq!(color.literals[1].value, None);

        let client = &sources.interfaces[0];
        assert_eq!(client.name, "PaintClient");
        assert_eq!(client.methods.len(), 1);
        assert_eq!(client.methods[0].input_args, vec![Field::new("colors", "&[Color]")]);
        assert_eq!(client.methods[0].related_struct.as_deref(), Some("PaintClient"));
    }

    #[test]
    fn test_compact_type_names() {
        assert_eq!(compact("& 'a mut Vec < String >"), "&'a mut Vec<String>");
        assert_eq!(compact("Option < & str >"), "Option<&str>");
        assert_eq!(compact("HashMap < String , u32 >"), "HashMap<String,u32>");
        assert_eq!(compact("events :: OrderCreated"), "events::OrderCreated");
    }
}
