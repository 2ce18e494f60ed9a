use thiserror::Error;

/// Errors produced while reading an OBJ model.
///
/// Any of these aborts the parse; the caller gets no model back.
#[derive(Error, Debug)]
pub enum ObjError {
    #[error("could not read OBJ input: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ input is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("line {line}: expected a number, found '{token}'")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: malformed face index '{token}'")]
    InvalidIndex { line: usize, token: String },

    #[error("line {line}: {kind} index {index} is out of range ({len} declared so far)")]
    IndexOutOfRange {
        line: usize,
        kind: AttributeKind,
        index: i64,
        len: usize,
    },

    #[error("line {line}: {kind} index {index} does not fit in 16 bits")]
    IndexOverflow {
        line: usize,
        kind: AttributeKind,
        index: usize,
    },

    #[error("group '{group}' has more vertices than a 16-bit index buffer can address")]
    TooManyVertices { group: String },

    #[error("group {index} does not exist (model has {count} groups)")]
    GroupOutOfRange { index: usize, count: usize },

    #[error("no group named '{0}'")]
    GroupNotFound(String),
}

/// Which attribute list a face reference points into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    TexCoord,
    Normal,
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttributeKind::Position => "position",
            AttributeKind::TexCoord => "texcoord",
            AttributeKind::Normal => "normal",
        };
        f.write_str(name)
    }
}
