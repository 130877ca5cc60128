//! # Classificador de Tokens
//!
//! Decide, token a token, se uma palavra pode fazer parte de uma entidade.
//! É um predicado puro `&str -> bool` e o único ponto do pipeline que conhece
//! a "forma" de uma palavra; o extrator só agrupa o que o classificador aprova.
//!
//! ## Políticas Disponíveis
//!
//! | Política                   | Aceita            | Rejeita                   |
//! |----------------------------|-------------------|---------------------------|
//! | `capitalized` (padrão)     | Los, Angeles, A   | NASA, los, McDonald       |
//! | `capitalized_or_acronym`   | Los, NASA, JPL    | los, McDonald             |
//! | `from_pattern(..)`         | o que o padrão casar por inteiro | o resto |
//!
//! Qualquer closure `Fn(&str) -> bool` também implementa [`TokenClassifier`],
//! então o extrator aceita políticas arbitrárias sem modificação.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tokenizer::Alphabet;

/// Predicado que decide se um token é elegível para compor uma entidade.
pub trait TokenClassifier {
    fn is_entity_part(&self, token: &str) -> bool;
}

impl<F> TokenClassifier for F
where
    F: Fn(&str) -> bool,
{
    fn is_entity_part(&self, token: &str) -> bool {
        self(token)
    }
}

/// Seletor serializável das políticas embutidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Uma maiúscula seguida de zero ou mais minúsculas.
    Capitalized,
    /// Como `Capitalized`, mas também aceita tokens inteiramente maiúsculos (siglas).
    CapitalizedOrAcronym,
}

impl Default for ClassifierKind {
    fn default() -> Self {
        ClassifierKind::Capitalized
    }
}

/// Classificador baseado na forma do token, via expressão regular ancorada.
///
/// O padrão compilado pertence à instância; não há estado global compartilhado.
/// A correspondência sempre cobre o token inteiro, nunca apenas um prefixo.
#[derive(Debug, Clone)]
pub struct ShapeClassifier {
    pattern: Regex,
}

impl ShapeClassifier {
    /// Política padrão: "uma maiúscula seguida de minúsculas".
    pub fn capitalized(alphabet: Alphabet) -> Self {
        let pattern = match alphabet {
            Alphabet::Ascii => r"^[A-Z][a-z]*$",
            Alphabet::Unicode => r"^\p{Lu}[\p{Ll}\p{M}]*$",
        };
        Self::compile_builtin(pattern)
    }

    /// Aceita palavras capitalizadas e siglas inteiramente maiúsculas.
    pub fn capitalized_or_acronym(alphabet: Alphabet) -> Self {
        let pattern = match alphabet {
            Alphabet::Ascii => r"^(?:[A-Z][a-z]*|[A-Z]+)$",
            Alphabet::Unicode => r"^(?:\p{Lu}[\p{Ll}\p{M}]*|(?:\p{Lu}\p{M}*)+)$",
        };
        Self::compile_builtin(pattern)
    }

    /// Constrói a política embutida selecionada por `kind`.
    pub fn from_kind(kind: ClassifierKind, alphabet: Alphabet) -> Self {
        match kind {
            ClassifierKind::Capitalized => Self::capitalized(alphabet),
            ClassifierKind::CapitalizedOrAcronym => Self::capitalized_or_acronym(alphabet),
        }
    }

    /// Compila um padrão do usuário, ancorado para casar o token inteiro.
    ///
    /// `"[A-Z]+"` passa a significar `^(?:[A-Z]+)$`. Um padrão que não compila
    /// é um erro de configuração.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{pattern})$");
        Ok(Self {
            pattern: Regex::new(&anchored)?,
        })
    }

    /// O padrão ancorado efetivamente usado.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    fn compile_builtin(pattern: &str) -> Self {
        // Padrões embutidos são literais cobertos pelos testes deste módulo
        let pattern = Regex::new(pattern).expect("padrão embutido inválido");
        Self { pattern }
    }
}

impl Default for ShapeClassifier {
    fn default() -> Self {
        Self::capitalized(Alphabet::Ascii)
    }
}

impl TokenClassifier for ShapeClassifier {
    fn is_entity_part(&self, token: &str) -> bool {
        self.pattern.is_match(token)
    }
}
