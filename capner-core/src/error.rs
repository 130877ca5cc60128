//! # Erros de Configuração
//!
//! Tokenização e extração são funções totais: uma vez construídos, o
//! [`Tokenizer`](crate::tokenizer::Tokenizer) e o
//! [`EntityExtractor`](crate::extractor::EntityExtractor) nunca falham no meio
//! do fluxo. Todos os erros possíveis acontecem na construção, antes de qualquer
//! texto ser processado.

use thiserror::Error;

/// Erros detectados ao montar um extrator ou pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Um limiar abaixo de 1 deixa o agrupamento sem sentido.
    #[error("min_repetitions deve ser pelo menos 1 (recebido: {got})")]
    InvalidMinRepetitions { got: usize },

    /// O padrão do classificador não compila.
    #[error("padrão de classificador inválido: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A configuração serializada não pôde ser lida.
    #[error("configuração malformada: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Alias de `Result` para operações de configuração.
pub type Result<T> = std::result::Result<T, ConfigError>;
