//! Error types for the preview engine.

use thiserror::Error;

/// The shader stage a compile diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Errors from compiling and linking a GPU program.
///
/// These are recoverable: the engine keeps rendering with the last
/// program that linked successfully and surfaces the log to the caller.
#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    /// A shader stage was rejected by the driver's compiler.
    #[error("{stage} shader error:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    /// Both stages compiled but the program failed to link.
    #[error("program link error:\n{0}")]
    Link(String),
}

/// Errors from setting up or driving the engine itself.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No GL context could be created for the window. Fatal for this
    /// engine instance; there is no retry.
    #[error("failed to acquire a GL context: {0}")]
    ContextUnavailable(String),

    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Errors from importing an OBJ model.
///
/// The parser is best-effort and only fails on malformed numeric
/// tokens or face references pointing outside the vertex tables. No
/// partial model is installed on failure.
#[derive(Debug, Clone, Error)]
pub enum ObjError {
    #[error("line {line}: expected a number, found '{token}'")]
    BadNumber { line: usize, token: String },

    #[error("line {line}: face references a vertex that does not exist")]
    BadIndex { line: usize },
}
