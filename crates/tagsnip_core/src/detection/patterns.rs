//! Per-language signature tables for the heuristic detector.
//!
//! Declaration order is significant: when two languages score the same,
//! the one listed first wins.

use regex::Regex;
use std::sync::OnceLock;

pub(super) type PatternTable = &'static [(&'static str, &'static [&'static str])];

pub(super) const PATTERNS: PatternTable = &[
    (
        "javascript",
        &[
            r"\bconst\s+\w+\s*=",
            r"\blet\s+\w+\s*=",
            r"\bfunction\s+\w+\s*\(",
            r"=>\s*\{",
            r"\bconsole\.(log|error|warn)\(",
            r#"\bimport\s+.*\s+from\s+['"]"#,
            r"\bexport\s+(default\s+)?(function|class|const)",
            r"\bdocument\.(getElementById|querySelector)",
            r"\bwindow\.",
            r"\basync\s+function",
            r"\bawait\s+",
            r"\.then\s*\(",
            r"\.map\s*\(",
            r"\.filter\s*\(",
            r"\.reduce\s*\(",
        ],
    ),
    (
        "typescript",
        &[
            r":\s*(string|number|boolean|any|void|never)\b",
            r"interface\s+\w+\s*\{",
            r"type\s+\w+\s*=",
            r"<\w+>",
            r":\s*\w+\[\]",
            r"as\s+(string|number|boolean)",
            r"\bReadonly<",
            r"\bPartial<",
            r"\bRecord<",
        ],
    ),
    (
        "python",
        &[
            r"\bdef\s+\w+\s*\(",
            r"\bclass\s+\w+.*:",
            r"\bimport\s+\w+",
            r"\bfrom\s+\w+\s+import",
            r"\bprint\s*\(",
            r"\bif\s+.*:",
            r"\bfor\s+\w+\s+in\s+",
            r"\belif\s+.*:",
            r"\bself\.",
            r"\b__init__\s*\(",
            r"\bTrue\b|\bFalse\b|\bNone\b",
            r"\blambda\s+",
            r"\bwith\s+.*\s+as\s+",
            r"\braise\s+\w+",
            r"\btry\s*:",
            r"\bexcept\s+.*:",
            r#""""\s*\n"#,
        ],
    ),
    (
        "java",
        &[
            r"\bpublic\s+class\s+\w+",
            r"\bprivate\s+(static\s+)?(void|int|String|boolean)",
            r"\bpublic\s+static\s+void\s+main",
            r"System\.out\.print",
            r"\bnew\s+\w+\(",
            r"\bextends\s+\w+",
            r"\bimplements\s+\w+",
            r"@Override",
            r"\bpackage\s+\w+",
            r"\bimport\s+java\.",
        ],
    ),
    (
        "cpp",
        &[
            r"#include\s*<.*>",
            r#"#include\s*".*""#,
            r"\bint\s+main\s*\(",
            r"\bstd::",
            r"\bcout\s*<<",
            r"\bcin\s*>>",
            r"\bprintf\s*\(",
            r"\bscanf\s*\(",
            r"\bvoid\s+\w+\s*\(",
            r"\bstruct\s+\w+",
            r"\bnamespace\s+\w+",
            r"\btemplate\s*<",
            r"\bclass\s+\w+\s*\{",
            r"->\w+",
            r"\bNULL\b",
            r"\bnullptr\b",
        ],
    ),
    (
        "go",
        &[
            r"\bpackage\s+main\b",
            r"\bfunc\s+\w+\s*\(",
            r"\bfunc\s+\(.*\)\s+\w+",
            r"\bimport\s+\(",
            r"\bfmt\.Print",
            r"\berr\s*!=\s*nil",
            r"\bdefer\s+",
            r"\bgo\s+func",
            r"\bchan\s+",
            r"\bmake\s*\(",
            r":=\s*",
        ],
    ),
    (
        "rust",
        &[
            r"\bfn\s+\w+\s*\(",
            r"\blet\s+mut\s+",
            r"\bimpl\s+\w+",
            r"\bpub\s+fn",
            r"\bstruct\s+\w+",
            r"\benum\s+\w+",
            r"\buse\s+std::",
            r"\bmatch\s+\w+",
            r"\bSome\(|\bNone\b",
            r"\bOk\(|\bErr\(",
            r"println!\s*\(",
            r"\bmod\s+\w+",
            r"&mut\s+",
            r"\bVec<",
        ],
    ),
    (
        "ruby",
        &[
            r"\bdef\s+\w+",
            r"\bclass\s+\w+\s*<",
            r"\bmodule\s+\w+",
            r#"\brequire\s+['"]"#,
            r"\bputs\s+",
            r"\bend\b",
            r"\battr_accessor\b",
            r"\bdo\s*\|",
            r"\.each\s+do",
            r"\bnil\b",
            r"@\w+\s*=",
        ],
    ),
    (
        "php",
        &[
            r"<\?php",
            r"\$\w+\s*=",
            r"\bfunction\s+\w+\s*\(",
            r"\becho\s+",
            r"\bclass\s+\w+\s*\{",
            r"\bpublic\s+function",
            r"\bprivate\s+function",
            r"->[\w]+\(",
            r"\barray\s*\(",
            r"\bforeach\s*\(",
            r"\$this->",
        ],
    ),
    (
        "sql",
        &[
            r"(?i)\bSELECT\s+.*\s+FROM\b",
            r"(?i)\bINSERT\s+INTO\b",
            r"(?i)\bUPDATE\s+\w+\s+SET\b",
            r"(?i)\bDELETE\s+FROM\b",
            r"(?i)\bCREATE\s+TABLE\b",
            r"(?i)\bALTER\s+TABLE\b",
            r"(?i)\bDROP\s+TABLE\b",
            r"(?i)\bWHERE\s+",
            r"(?i)\bJOIN\s+\w+\s+ON\b",
            r"(?i)\bGROUP\s+BY\b",
            r"(?i)\bORDER\s+BY\b",
        ],
    ),
    (
        "html",
        &[
            r"(?i)<!DOCTYPE\s+html>",
            r"<html.*>",
            r"<head>",
            r"<body>",
            r"<div.*>",
            r"<span.*>",
            r"<p.*>",
            r"<a\s+href=",
            r"<img\s+src=",
            r"<script.*>",
            r"<style.*>",
            r"</\w+>",
        ],
    ),
    (
        "css",
        &[
            r"\.\w+\s*\{",
            r"#\w+\s*\{",
            r"\w+\s*\{\s*\n?\s*[\w-]+\s*:",
            r":\s*(flex|grid|block|inline|none)",
            r"background(-color)?:",
            r"font-(size|family|weight):",
            r"margin:|padding:",
            r"border(-radius)?:",
            r"@media\s+",
            r"@keyframes\s+",
            r":\s*#[0-9a-fA-F]{3,6}",
            r":\s*rgb\(",
        ],
    ),
    (
        "json",
        &[
            r#"^\s*\{\s*"\w+":"#,
            r"^\s*\[\s*\{",
            r#""\w+"\s*:\s*"[^"]*""#,
            r#""\w+"\s*:\s*\d+"#,
            r#""\w+"\s*:\s*(true|false|null)"#,
            r#""\w+"\s*:\s*\["#,
            r#""\w+"\s*:\s*\{"#,
        ],
    ),
    (
        "yaml",
        &[
            r"(?m)^\w+:\s*$",
            r"(?m)^\s+-\s+\w+:",
            r"(?m)^\s+\w+:\s+.+$",
            r"(?m)^---\s*$",
            r"(?m):\s*\|$",
            r"(?m):\s*>$",
        ],
    ),
    (
        "markdown",
        &[
            r"(?m)^#{1,6}\s+.+$",
            r"(?m)^\*\*.*\*\*$",
            r"(?m)^[-*]\s+.+$",
            r"(?m)^\d+\.\s+.+$",
            r"\[.*\]\(.*\)",
            r"(?m)^```\w*$",
            r"(?m)^>\s+.+$",
            r"!\[.*\]\(.*\)",
        ],
    ),
    (
        "bash",
        &[
            r"^#!",
            r"\becho\s+",
            r"\bexport\s+\w+=",
            r"\bif\s+\[\s+",
            r"\bfi\b",
            r"\bfor\s+\w+\s+in\b",
            r"\bdone\b",
            r"\bfunction\s+\w+\s*\(\)",
            r"\$\{\w+\}",
            r"\$\w+",
            r"\|\s*grep",
            r"\|\s*awk",
            r"\bsudo\s+",
            r"\bcd\s+",
            r"\bmkdir\s+",
        ],
    ),
];

/// A language id paired with its compiled signatures.
pub(super) struct CompiledLanguage {
    pub id: &'static str,
    pub signatures: Vec<Regex>,
}

/// Compiled signature table, built once on first use.
pub(super) fn compiled() -> &'static [CompiledLanguage] {
    static COMPILED: OnceLock<Vec<CompiledLanguage>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .map(|&(id, sources)| CompiledLanguage {
                id,
                signatures: sources
                    .iter()
                    .filter_map(|source| match Regex::new(source) {
                        Ok(regex) => Some(regex),
                        Err(err) => {
                            tracing::error!("invalid {} signature {:?}: {}", id, source, err);
                            None
                        }
                    })
                    .collect(),
            })
            .collect()
    })
}
