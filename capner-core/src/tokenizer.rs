//! # Tokenizador Preguiçoso
//!
//! Divide o texto bruto em tokens: sequências máximas de letras. Espaços,
//! pontuação, dígitos e símbolos funcionam apenas como separadores e nunca
//! aparecem dentro de um token (nem viram tokens vazios).
//!
//! A tokenização é **preguiçosa**: [`Tokens`] é um iterador que avança sobre o
//! texto sob demanda, sem materializar a lista completa. Isso permite processar
//! textos arbitrariamente longos com estado O(1) no tokenizador.
//!
//! ## Alfabetos
//!
//! - **Ascii** (padrão): apenas `[A-Za-z]` contam como letras. Letras acentuadas
//!   são separadores, portanto "São" vira "S" e "o".
//! - **Unicode**: qualquer cluster de grafemas cuja base seja alfabética.
//!   Marcas combinantes ficam presas à letra base ("José" é um único token,
//!   esteja ele composto ou decomposto).
//!
//! Para outras noções de token, [`Tokenizer::from_pattern`] aceita uma regex:
//! cada casamento não vazio vira um token.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use capner_core::tokenizer::{tokenize, Alphabet, Tokenizer};
//!
//! let tokens: Vec<&str> = tokenize("Visitamos Los Angeles.").collect();
//! assert_eq!(tokens, ["Visitamos", "Los", "Angeles"]);
//!
//! let unicode = Tokenizer::new(Alphabet::Unicode);
//! let tokens: Vec<&str> = unicode.tokenize("São Paulo, 2024").collect();
//! assert_eq!(tokens, ["São", "Paulo"]);
//! ```

use std::iter::FusedIterator;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;

/// Quais caracteres contam como letras para o tokenizador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// **ASCII**: somente `A-Z` e `a-z`. Comportamento de referência.
    Ascii,
    /// **Unicode**: clusters de grafemas com base alfabética (acentos, outros scripts).
    Unicode,
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::Ascii
    }
}

/// Regra que define o que é um token.
#[derive(Debug, Clone)]
enum TokenRule {
    /// Sequências máximas de letras do alfabeto.
    Alphabet(Alphabet),
    /// Cada casamento não vazio do padrão, na ordem do texto.
    Pattern(Regex),
}

/// Tokenizador configurado com um [`Alphabet`] ou com um padrão próprio.
///
/// É imutável; cada chamada a [`Tokenizer::tokenize`] produz um iterador novo
/// e independente.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    rule: TokenRule,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(Alphabet::default())
    }
}

impl Tokenizer {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            rule: TokenRule::Alphabet(alphabet),
        }
    }

    /// Tokenizador cujos tokens são os casamentos não vazios de `pattern`.
    ///
    /// Ao contrário do classificador, o padrão não é ancorado: ele é buscado
    /// ao longo do texto, e o que fica entre dois casamentos é descartado.
    /// Casamentos vazios nunca viram tokens. Um padrão que não compila é um
    /// erro de configuração.
    ///
    /// ```rust
    /// use capner_core::tokenizer::Tokenizer;
    ///
    /// let tokenizer = Tokenizer::from_pattern(r"[A-Za-z']+").unwrap();
    /// let tokens: Vec<&str> = tokenizer.tokenize("O'Brien met Anna.").collect();
    /// assert_eq!(tokens, ["O'Brien", "met", "Anna"]);
    /// ```
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            rule: TokenRule::Pattern(Regex::new(pattern)?),
        })
    }

    /// O alfabeto configurado, ou `None` para tokenizadores baseados em padrão.
    pub fn alphabet(&self) -> Option<Alphabet> {
        match self.rule {
            TokenRule::Alphabet(alphabet) => Some(alphabet),
            TokenRule::Pattern(_) => None,
        }
    }

    /// Retorna um iterador preguiçoso sobre os tokens de `text`.
    ///
    /// O iterador é de passagem única e não pode ser clonado: para recomeçar é
    /// preciso chamar `tokenize` de novo sobre o mesmo texto.
    pub fn tokenize<'h>(&self, text: &'h str) -> Tokens<'h> {
        Tokens {
            text,
            pos: 0,
            rule: self.rule.clone(),
        }
    }
}

/// Tokeniza um texto com o alfabeto padrão (ASCII).
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokenizer::default().tokenize(text)
}

/// Iterador preguiçoso de tokens, emprestando fatias do texto original.
///
/// Guarda apenas a posição do cursor; cada `next` localiza o próximo token a
/// partir dela, devolve-o e avança o cursor para logo depois dele.
#[derive(Debug)]
pub struct Tokens<'h> {
    text: &'h str,
    pos: usize,
    rule: TokenRule,
}

impl<'h> Iterator for Tokens<'h> {
    type Item = &'h str;

    fn next(&mut self) -> Option<&'h str> {
        let rest = &self.text[self.pos..];
        let offset = |(start, end): (usize, usize)| (self.pos + start, self.pos + end);
        let found = match &self.rule {
            TokenRule::Alphabet(Alphabet::Ascii) => find_ascii_run(rest).map(offset),
            TokenRule::Alphabet(Alphabet::Unicode) => find_grapheme_run(rest).map(offset),
            TokenRule::Pattern(pattern) => find_pattern_match(pattern, self.text, self.pos),
        };
        let Some((start, end)) = found else {
            self.pos = self.text.len();
            return None;
        };
        self.pos = end;
        Some(&self.text[start..end])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Cada token ocupa pelo menos um byte
        (0, Some(self.text.len() - self.pos))
    }
}

impl FusedIterator for Tokens<'_> {}

/// Próximo casamento não vazio de `pattern` a partir de `from`, em posições absolutas.
///
/// A busca usa o texto inteiro para que âncoras e `\b` vejam o contexto real.
fn find_pattern_match(pattern: &Regex, text: &str, from: usize) -> Option<(usize, usize)> {
    let mut at = from;
    while at <= text.len() {
        let m = pattern.find_at(text, at)?;
        if !m.is_empty() {
            return Some((m.start(), m.end()));
        }
        at = m.end() + text[m.end()..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// Localiza a próxima sequência `[A-Za-z]+` e retorna seus limites em bytes.
///
/// Letras ASCII ocupam um byte, então os limites sempre caem em fronteiras de
/// caractere UTF-8.
fn find_ascii_run(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_alphabetic)?;
    let end = bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_alphabetic())
        .map_or(bytes.len(), |len| start + len);
    Some((start, end))
}

/// Localiza a próxima sequência de grafemas alfabéticos.
fn find_grapheme_run(text: &str) -> Option<(usize, usize)> {
    let mut graphemes = text.grapheme_indices(true);
    let (start, _) = graphemes.by_ref().find(|(_, g)| is_letter_grapheme(g))?;
    let end = graphemes
        .find(|(_, g)| !is_letter_grapheme(g))
        .map_or(text.len(), |(i, _)| i);
    Some((start, end))
}

fn is_letter_grapheme(grapheme: &str) -> bool {
    grapheme.chars().next().is_some_and(char::is_alphabetic)
}
