//! File extension to splitting strategy lookup.
//!
//! Every accepted upload maps to a [`Language`], and every language carries
//! an ordered list of separators for the [`RecursiveSplitter`]. Code
//! languages split on declaration keywords at the start of a line before
//! falling back to blank lines, newlines, spaces and finally characters.
//! Their separators are regular expressions; [`Language::Text`] uses plain
//! literal separators.
//!
//! [`RecursiveSplitter`]: crate::splitter::RecursiveSplitter

/// Splitting strategy selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Js,
    Ts,
    Java,
    Kotlin,
    Cpp,
    C,
    Go,
    Rust,
    Ruby,
    Php,
    CSharp,
    Swift,
    Markdown,
    Rst,
    Html,
    PowerShell,
    Lua,
    Perl,
    Haskell,
    Elixir,
    Solidity,
    Cobol,
    VisualBasic6,
    Latex,
    Proto,
    /// Plain prose; split on paragraphs, lines, then words.
    Text,
}

/// Extension table. Keys are lower-case and include the leading dot.
const EXTENSIONS: &[(&str, Language)] = &[
    (".py", Language::Python),
    (".pyw", Language::Python),
    (".pyx", Language::Python),
    (".js", Language::Js),
    (".jsx", Language::Js),
    (".mjs", Language::Js),
    (".ts", Language::Ts),
    (".tsx", Language::Ts),
    (".java", Language::Java),
    (".kt", Language::Kotlin),
    (".kts", Language::Kotlin),
    (".cpp", Language::Cpp),
    (".cc", Language::Cpp),
    (".cxx", Language::Cpp),
    (".c++", Language::Cpp),
    (".hpp", Language::Cpp),
    (".h", Language::Cpp),
    (".c", Language::C),
    (".go", Language::Go),
    (".rs", Language::Rust),
    (".rb", Language::Ruby),
    (".erb", Language::Ruby),
    (".gemfile", Language::Ruby),
    (".php", Language::Php),
    (".phtml", Language::Php),
    (".php4", Language::Php),
    (".php5", Language::Php),
    (".cs", Language::CSharp),
    (".swift", Language::Swift),
    (".md", Language::Markdown),
    (".markdown", Language::Markdown),
    (".rst", Language::Rst),
    (".html", Language::Html),
    (".htm", Language::Html),
    (".xhtml", Language::Html),
    (".ps1", Language::PowerShell),
    (".psm1", Language::PowerShell),
    (".lua", Language::Lua),
    (".pl", Language::Perl),
    (".pm", Language::Perl),
    (".hs", Language::Haskell),
    (".lhs", Language::Haskell),
    (".ex", Language::Elixir),
    (".exs", Language::Elixir),
    (".sol", Language::Solidity),
    (".cob", Language::Cobol),
    (".cbl", Language::Cobol),
    (".vb", Language::VisualBasic6),
    (".bas", Language::VisualBasic6),
    (".tex", Language::Latex),
    (".latex", Language::Latex),
    (".proto", Language::Proto),
    (".txt", Language::Text),
    (".text", Language::Text),
];

/// Separators for plain text, matched literally.
pub const TEXT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

const C_FAMILY: &[&str] = &[
    "\nclass ", "\nvoid ", "\nint ", "\nfloat ", "\ndouble ", "\nif ", "\nfor ", "\nwhile ",
    "\nswitch ", "\ncase ", "\n\n", "\n", " ", "",
];

impl Language {
    /// Look up the language for an extension such as `.py` or `.PY`.
    ///
    /// A missing leading dot is tolerated.
    pub fn from_extension(ext: &str) -> Option<Language> {
        let ext = ext.to_lowercase();
        let key = if ext.starts_with('.') {
            ext
        } else {
            format!(".{}", ext)
        };
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == key)
            .map(|(_, lang)| *lang)
    }

    /// Whether [`separators`](Self::separators) are regular expressions.
    pub fn separators_are_regex(&self) -> bool {
        !matches!(self, Language::Text)
    }

    /// Ordered separators, most structural first. The final empty
    /// separator means "split into characters".
    pub fn separators(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["\nclass ", "\ndef ", "\n\tdef ", "\n\n", "\n", " ", ""],
            Language::Js => &[
                "\nfunction ", "\nconst ", "\nlet ", "\nvar ", "\nclass ", "\nif ", "\nfor ",
                "\nwhile ", "\nswitch ", "\ncase ", "\ndefault ", "\n\n", "\n", " ", "",
            ],
            Language::Ts => &[
                "\nenum ", "\ninterface ", "\nnamespace ", "\ntype ", "\nclass ", "\nfunction ",
                "\nconst ", "\nlet ", "\nvar ", "\nif ", "\nfor ", "\nwhile ", "\nswitch ",
                "\ncase ", "\ndefault ", "\n\n", "\n", " ", "",
            ],
            Language::Java => &[
                "\nclass ", "\npublic ", "\nprotected ", "\nprivate ", "\nstatic ", "\nif ",
                "\nfor ", "\nwhile ", "\nswitch ", "\ncase ", "\n\n", "\n", " ", "",
            ],
            Language::Kotlin => &[
                "\nclass ", "\npublic ", "\nprotected ", "\nprivate ", "\ninternal ",
                "\ncompanion ", "\nfun ", "\nval ", "\nvar ", "\nif ", "\nfor ", "\nwhile ",
                "\nwhen ", "\ncase ", "\nelse ", "\n\n", "\n", " ", "",
            ],
            Language::Cpp | Language::C => C_FAMILY,
            Language::Go => &[
                "\nfunc ", "\nvar ", "\nconst ", "\ntype ", "\nif ", "\nfor ", "\nswitch ",
                "\ncase ", "\n\n", "\n", " ", "",
            ],
            Language::Rust => &[
                "\nfn ", "\nconst ", "\nlet ", "\nif ", "\nwhile ", "\nfor ", "\nloop ",
                "\nmatch ", "\n\n", "\n", " ", "",
            ],
            Language::Ruby => &[
                "\ndef ", "\nclass ", "\nif ", "\nunless ", "\nwhile ", "\nfor ", "\ndo ",
                "\nbegin ", "\nrescue ", "\n\n", "\n", " ", "",
            ],
            Language::Php => &[
                "\nfunction ", "\nclass ", "\nif ", "\nforeach ", "\nwhile ", "\ndo ",
                "\nswitch ", "\ncase ", "\n\n", "\n", " ", "",
            ],
            Language::CSharp => &[
                "\ninterface ", "\nenum ", "\nimplements ", "\ndelegate ", "\nevent ",
                "\nclass ", "\nabstract ", "\npublic ", "\nprotected ", "\nprivate ",
                "\nstatic ", "\nreturn ", "\nif ", "\ncontinue ", "\nfor ", "\nforeach ",
                "\nwhile ", "\nswitch ", "\nbreak ", "\ncase ", "\nelse ", "\ntry ", "\nthrow ",
                "\nfinally ", "\ncatch ", "\n\n", "\n", " ", "",
            ],
            Language::Swift => &[
                "\nfunc ", "\nclass ", "\nstruct ", "\nenum ", "\nif ", "\nfor ", "\nwhile ",
                "\ndo ", "\nswitch ", "\ncase ", "\n\n", "\n", " ", "",
            ],
            Language::Markdown => &[
                "\n#{1,6} ",
                "```\n",
                "\n\\*\\*\\*+\n",
                "\n---+\n",
                "\n___+\n",
                "\n\n",
                "\n",
                " ",
                "",
            ],
            Language::Rst => &[
                "\n=+\n", "\n-+\n", "\n\\*+\n", "\n\n\\.\\. *\n\n", "\n\n", "\n", " ", "",
            ],
            Language::Html => &[
                "<body", "<div", "<p", "<br", "<li", "<h1", "<h2", "<h3", "<h4", "<h5", "<h6",
                "<span", "<table", "<tr", "<td", "<th", "<ul", "<ol", "<header", "<footer",
                "<nav", "<head", "<style", "<script", "<meta", "<title", "",
            ],
            Language::PowerShell => &[
                "\nfunction ", "\nparam ", "\nif ", "\nforeach ", "\nfor ", "\nwhile ",
                "\nswitch ", "\nclass ", "\ntry ", "\ncatch ", "\nfinally ", "\n\n", "\n", " ",
                "",
            ],
            Language::Lua => &[
                "\nlocal ", "\nfunction ", "\nif ", "\nfor ", "\nwhile ", "\nrepeat ", "\n\n",
                "\n", " ", "",
            ],
            Language::Perl => &[
                "\nsub ", "\npackage ", "\nuse ", "\nif ", "\nunless ", "\nwhile ", "\nfor ",
                "\nforeach ", "\nelsif ", "\nelse ", "\n\n", "\n", " ", "",
            ],
            Language::Haskell => &[
                "\nmain :: ", "\nmain = ", "\nlet ", "\nin ", "\ndo ", "\nwhere ", "\n:: ",
                "\n= ", "\ndata ", "\nnewtype ", "\ntype ", "\nmodule ", "\nimport ",
                "\nqualified ", "\nimport qualified ", "\nclass ", "\ninstance ", "\ncase ",
                "\n\\| ", "\n= \\{", "\n, ", "\n\n", "\n", " ", "",
            ],
            Language::Elixir => &[
                "\ndef ", "\ndefp ", "\ndefmodule ", "\ndefprotocol ", "\ndefmacro ",
                "\ndefmacrop ", "\nif ", "\nunless ", "\nwhile ", "\ncase ", "\ncond ",
                "\nwith ", "\nfor ", "\ndo ", "\n\n", "\n", " ", "",
            ],
            Language::Solidity => &[
                "\npragma ", "\nusing ", "\ncontract ", "\ninterface ", "\nlibrary ",
                "\nconstructor ", "\ntype ", "\nfunction ", "\nevent ", "\nmodifier ",
                "\nerror ", "\nstruct ", "\nenum ", "\nif ", "\nfor ", "\nwhile ",
                "\ndo while ", "\nassembly ", "\n\n", "\n", " ", "",
            ],
            Language::Cobol => &[
                "\nIDENTIFICATION DIVISION\\.",
                "\nENVIRONMENT DIVISION\\.",
                "\nDATA DIVISION\\.",
                "\nPROCEDURE DIVISION\\.",
                "\nWORKING-STORAGE SECTION\\.",
                "\nLINKAGE SECTION\\.",
                "\nFILE SECTION\\.",
                "\nINPUT-OUTPUT SECTION\\.",
                "\nOPEN ",
                "\nCLOSE ",
                "\nREAD ",
                "\nWRITE ",
                "\nIF ",
                "\nELSE ",
                "\nMOVE ",
                "\nPERFORM ",
                "\nUNTIL ",
                "\nVARYING ",
                "\nACCEPT ",
                "\nDISPLAY ",
                "\nSTOP RUN\\.",
                "\n",
                " ",
                "",
            ],
            Language::VisualBasic6 => &[
                r"\n(?:(?:Public|Private|Friend|Global|Static)\s+)?Sub\s+",
                r"\n(?:(?:Public|Private|Friend|Global|Static)\s+)?Function\s+",
                r"\n(?:(?:Public|Private|Friend|Global|Static)\s+)?Property\s+(?:Get|Let|Set)\s+",
                r"\n(?:(?:Public|Private|Friend|Global|Static)\s+)?Type\s+",
                r"\n(?:(?:Public|Private|Friend|Global|Static)\s+)?Enum\s+",
                r"\nIf\s+",
                r"\nElseIf\s+",
                r"\nElse\s+",
                r"\nSelect\s+Case\s+",
                r"\nCase\s+",
                r"\nFor\s+",
                r"\nDo\s+",
                r"\nWhile\s+",
                r"\nWith\s+",
                r"\n\n",
                r"\n",
                " ",
                "",
            ],
            Language::Latex => &[
                "\n\\\\chapter\\{",
                "\n\\\\section\\{",
                "\n\\\\subsection\\{",
                "\n\\\\subsubsection\\{",
                "\n\\\\begin\\{enumerate\\}",
                "\n\\\\begin\\{itemize\\}",
                "\n\\\\begin\\{description\\}",
                "\n\\\\begin\\{list\\}",
                "\n\\\\begin\\{quote\\}",
                "\n\\\\begin\\{quotation\\}",
                "\n\\\\begin\\{verse\\}",
                "\n\\\\begin\\{verbatim\\}",
                "\n\\\\begin\\{align\\}",
                "\\$\\$",
                "\\$",
                " ",
                "",
            ],
            Language::Proto => &[
                "\nmessage ", "\nservice ", "\nenum ", "\noption ", "\nimport ", "\nsyntax ",
                "\n\n", "\n", " ", "",
            ],
            Language::Text => TEXT_SEPARATORS,
        }
    }
}

/// All accepted extensions, sorted, for error messages.
pub fn allowed_extensions() -> Vec<&'static str> {
    let mut exts: Vec<&'static str> = EXTENSIONS.iter().map(|(e, _)| *e).collect();
    exts.sort_unstable();
    exts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Language::from_extension(".py"), Some(Language::Python));
        assert_eq!(Language::from_extension(".PY"), Some(Language::Python));
        assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
    }

    #[test]
    fn test_header_files_use_cpp() {
        assert_eq!(Language::from_extension(".h"), Some(Language::Cpp));
        assert_eq!(Language::from_extension(".c"), Some(Language::C));
    }

    #[test]
    fn test_plain_text_is_accepted() {
        let lang = Language::from_extension(".txt").unwrap();
        assert_eq!(lang, Language::Text);
        assert!(!lang.separators_are_regex());
        assert_eq!(lang.separators(), TEXT_SEPARATORS);
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(Language::from_extension(".exe"), None);
        assert_eq!(Language::from_extension(".scala"), None);
        assert_eq!(Language::from_extension(""), None);
    }

    #[test]
    fn test_every_language_ends_with_char_split() {
        for (_, lang) in EXTENSIONS {
            assert_eq!(lang.separators().last(), Some(&""), "{:?}", lang);
        }
    }

    #[test]
    fn test_every_separator_compiles() {
        for (_, lang) in EXTENSIONS {
            for sep in lang.separators() {
                let pattern = if lang.separators_are_regex() {
                    sep.to_string()
                } else {
                    regex::escape(sep)
                };
                assert!(
                    regex::Regex::new(&pattern).is_ok(),
                    "{:?} separator {:?} does not compile",
                    lang,
                    sep
                );
            }
        }
    }

    #[test]
    fn test_allowed_extensions_sorted() {
        let exts = allowed_extensions();
        assert!(exts.contains(&".md"));
        assert!(exts.contains(&".txt"));
        let mut sorted = exts.clone();
        sorted.sort_unstable();
        assert_eq!(exts, sorted);
    }
}
