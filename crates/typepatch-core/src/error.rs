use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to load Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("syntax error in {}:{line}:{column}", .path.display())]
    Syntax {
        path: std::path::PathBuf,
        line: usize,
        column: usize,
    },

    #[error("parser returned no tree for {}", .0.display())]
    NoTree(std::path::PathBuf),
}
