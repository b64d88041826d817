//! Import statement scanning for TypeScript/JavaScript sources
//!
//! Recognizes static `import ... from "x"`, re-exports `export ... from "x"`,
//! side-effect `import "x"`, dynamic `import("x")` and `require("x")`.
//! Specifiers are returned in source order.

use once_cell::sync::Lazy;
use regex::Regex;

// The clause before `from` must be a binding list: `{ ... }`, `* as ns`,
// `*`, a default binding, or a default binding followed by one of those.
static FROM_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?m)^[ \t]*(?:import|export)\b(?:\s+type\b)?\s*"#,
        r#"(?:\{[^}]*\}|\*(?:\s*as\s+[\w$]+)?|[\w$]+(?:\s*,\s*(?:\{[^}]*\}|\*\s*as\s+[\w$]+))?)"#,
        r#"\s*from\s*["']([^"'\n]*)["']"#,
    ))
    .expect("valid import regex")
});

static SIDE_EFFECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s*["']([^"'\n]*)["']"#).expect("valid import regex")
});

static CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:import|require)\s*\(\s*["']([^"'\n]*)["']\s*\)"#)
        .expect("valid import regex")
});

/// An import whose specifier cannot be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedImport {
    /// 1-based line of the statement
    pub line: usize,
    pub detail: String,
}

impl std::fmt::Display for MalformedImport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.detail)
    }
}

/// Extract import specifiers from a source file, in source order
pub fn scan_imports(source: &str) -> Result<Vec<String>, MalformedImport> {
    let mut found: Vec<(usize, &str)> = Vec::new();

    for pattern in [&*FROM_CLAUSE, &*SIDE_EFFECT, &*CALL] {
        for caps in pattern.captures_iter(source) {
            if let Some(spec) = caps.get(1) {
                found.push((spec.start(), spec.as_str()));
            }
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.dedup_by_key(|(offset, _)| *offset);

    let mut specifiers = Vec::with_capacity(found.len());
    for (offset, spec) in found {
        if spec.trim().is_empty() {
            return Err(MalformedImport {
                line: line_of(source, offset),
                detail: "empty module specifier".to_string(),
            });
        }
        if spec != spec.trim() {
            return Err(MalformedImport {
                line: line_of(source, offset),
                detail: format!("module specifier '{spec}' has surrounding whitespace"),
            });
        }
        specifiers.push(spec.to_string());
    }

    Ok(specifiers)
}

/// Whether a specifier is relative to the importing file
pub fn is_relative(specifier: &str) -> bool {
    specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_static_imports() {
        let source = r#""use client";

import { zodResolver } from "@hookform/resolvers/zod";
import { ArrowRight } from "lucide-react";
import {
  Controller,
  useForm,
} from "react-hook-form";
import type { CSSProperties } from 'react';

import { cn } from "@/lib/utils";
"#;

        let imports = scan_imports(source).unwrap();
        assert_eq!(
            imports,
            vec![
                "@hookform/resolvers/zod",
                "lucide-react",
                "react-hook-form",
                "react",
                "@/lib/utils",
            ]
        );
    }

    #[test]
    fn test_scan_side_effect_dynamic_and_reexport() {
        let source = r#"import "./styles.css";
export { Button } from "@/components/ui/button";
const Chart = lazy(() => import("./chart"));
const legacy = require("legacy-lib");
"#;

        let imports = scan_imports(source).unwrap();
        assert_eq!(
            imports,
            vec!["./styles.css", "@/components/ui/button", "./chart", "legacy-lib"]
        );
    }

    #[test]
    fn test_ignores_non_import_text() {
        let source = r#"const text = "Data from 'somewhere'";
// import { Old } from "old-lib";
"#;
        assert!(scan_imports(source).unwrap().is_empty());
    }

    #[test]
    fn test_jsx_text_after_export_is_not_an_import() {
        let source = r#"export function Attribution() {
  return <p>Copied from 'docs'</p>;
}

export default function Quote() {
  return <blockquote>Taken from "the archive"</blockquote>;
}
"#;
        assert!(scan_imports(source).unwrap().is_empty());
    }

    #[test]
    fn test_binding_forms() {
        let source = r#"import React, { useState } from "react";
import * as Dialog from "@radix-ui/react-dialog";
import type Props from "./props";
export * from "./variants";
export * as icons from "lucide-react";
export type { ButtonProps } from "@/components/ui/button";
"#;
        assert_eq!(
            scan_imports(source).unwrap(),
            vec![
                "react",
                "@radix-ui/react-dialog",
                "./props",
                "./variants",
                "lucide-react",
                "@/components/ui/button",
            ]
        );
    }

    #[test]
    fn test_empty_specifier_is_malformed() {
        let source = "import x from \"\";\n";
        let err = scan_imports(source).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.detail.contains("empty"));
    }

    #[test]
    fn test_is_relative() {
        assert!(is_relative("./chart"));
        assert!(is_relative("../shared/logo"));
        assert!(!is_relative("@/components/ui/button"));
        assert!(!is_relative("react"));
    }
}
