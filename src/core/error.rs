use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FindingError {
    #[error("Descripción requerida")]
    EmptyDescription,
    #[error("Formato inválido: ninguna línea contiene un código LDA/FC reconocible. Revise la guía.")]
    NoParsedLines,
    #[error("Error JSON: {0}")]
    ImportFormat(String),
}
