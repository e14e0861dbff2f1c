//! Catalogue of known language ids with display names and file extensions.

/// A known language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub id: &'static str,
    pub name: &'static str,
    pub extension: &'static str,
}

const fn lang(id: &'static str, name: &'static str, extension: &'static str) -> Language {
    Language {
        id,
        name,
        extension,
    }
}

/// Every language a snippet can be tagged with.
pub const LANGUAGES: &[Language] = &[
    lang("javascript", "JavaScript", ".js"),
    lang("typescript", "TypeScript", ".ts"),
    lang("jsx", "JSX", ".jsx"),
    lang("tsx", "TSX", ".tsx"),
    lang("python", "Python", ".py"),
    lang("java", "Java", ".java"),
    lang("csharp", "C#", ".cs"),
    lang("cpp", "C++", ".cpp"),
    lang("c", "C", ".c"),
    lang("go", "Go", ".go"),
    lang("rust", "Rust", ".rs"),
    lang("ruby", "Ruby", ".rb"),
    lang("php", "PHP", ".php"),
    lang("swift", "Swift", ".swift"),
    lang("kotlin", "Kotlin", ".kt"),
    lang("scala", "Scala", ".scala"),
    lang("html", "HTML", ".html"),
    lang("css", "CSS", ".css"),
    lang("scss", "SCSS", ".scss"),
    lang("less", "Less", ".less"),
    lang("sql", "SQL", ".sql"),
    lang("graphql", "GraphQL", ".graphql"),
    lang("json", "JSON", ".json"),
    lang("yaml", "YAML", ".yaml"),
    lang("xml", "XML", ".xml"),
    lang("markdown", "Markdown", ".md"),
    lang("bash", "Bash", ".sh"),
    lang("powershell", "PowerShell", ".ps1"),
    lang("dockerfile", "Dockerfile", "Dockerfile"),
    lang("lua", "Lua", ".lua"),
    lang("perl", "Perl", ".pl"),
    lang("r", "R", ".r"),
    lang("haskell", "Haskell", ".hs"),
    lang("elixir", "Elixir", ".ex"),
    lang("clojure", "Clojure", ".clj"),
    lang("dart", "Dart", ".dart"),
    lang("toml", "TOML", ".toml"),
    lang("ini", "INI", ".ini"),
    lang("diff", "Diff", ".diff"),
    lang("makefile", "Makefile", "Makefile"),
    lang("plaintext", "Plain Text", ".txt"),
];

/// Languages offered first in pickers.
pub const COMMON_LANGUAGES: &[&str] = &[
    "javascript",
    "typescript",
    "python",
    "java",
    "go",
    "rust",
    "html",
    "css",
    "sql",
    "json",
    "bash",
    "markdown",
];

const PLAINTEXT: Language = lang("plaintext", "Plain Text", ".txt");

/// Look up a language by id, falling back to plain text.
pub fn language_by_id(id: &str) -> Language {
    LANGUAGES
        .iter()
        .copied()
        .find(|language| language.id == id)
        .unwrap_or(PLAINTEXT)
}

/// Whether `id` names a catalogued language.
pub fn is_known(id: &str) -> bool {
    LANGUAGES.iter().any(|language| language.id == id)
}

/// Infer a language from a file name's extension (or exact name for
/// extension-less files such as `Dockerfile`).
pub fn language_for_file_name(file_name: &str) -> Option<&'static str> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    if let Some(language) = LANGUAGES.iter().find(|l| l.extension == base) {
        return Some(language.id);
    }
    let (_, ext) = base.rsplit_once('.')?;
    let dotted = format!(".{}", ext.to_ascii_lowercase());
    if let Some(language) = LANGUAGES.iter().find(|l| l.extension == dotted) {
        return Some(language.id);
    }
    match dotted.as_str() {
        ".mjs" | ".cjs" => Some("javascript"),
        ".yml" => Some("yaml"),
        ".h" | ".hpp" | ".cc" => Some("cpp"),
        ".zsh" | ".bash" => Some("bash"),
        ".htm" => Some("html"),
        _ => None,
    }
}
