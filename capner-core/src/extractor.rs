//! # Extrator de Entidades por Sequências
//!
//! Percorre o fluxo de tokens uma única vez e agrupa tokens consecutivos aceitos
//! pelo [`TokenClassifier`] em *sequências* (runs). Uma sequência com pelo
//! menos `min_repetitions` tokens vira uma entidade: seus tokens unidos por um
//! espaço simples.
//!
//! ## Máquina de Estados
//!
//! | Estado  | Token         | Próximo | Efeito                                 |
//! |---------|---------------|---------|----------------------------------------|
//! | FORA    | qualifica     | DENTRO  | sequência := [token]                   |
//! | DENTRO  | qualifica     | DENTRO  | sequência += token                     |
//! | DENTRO  | não qualifica | FORA    | emite se len ≥ limiar; descarta        |
//! | FORA    | não qualifica | FORA    | nada                                   |
//! | DENTRO  | fim do fluxo  | —       | emite se len ≥ limiar                  |
//!
//! - O agrupamento é guloso e sem sobreposição: uma sequência de k tokens gera
//!   exatamente uma entidade de k tokens, nunca várias menores.
//! - Não há tolerância a lacunas: um token reprovado sempre encerra a sequência.
//! - O resultado de [`EntityExtractor::extract`] é um conjunto; entidades
//!   repetidas no texto colapsam num único elemento.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use capner_core::extractor::EntityExtractor;
//! use capner_core::tokenizer::tokenize;
//!
//! let extractor = EntityExtractor::with_default_classifier(2).unwrap();
//! let text = "When we went to Los Angeles last year we visited the Hollywood Sign";
//! let entities = extractor.extract(tokenize(text));
//!
//! assert!(entities.contains("Los Angeles"));
//! assert!(entities.contains("Hollywood Sign"));
//! assert_eq!(entities.len(), 2);
//! ```

use std::collections::HashSet;
use std::iter::FusedIterator;
use std::mem;

use serde::{Deserialize, Serialize};

use crate::classifier::{ShapeClassifier, TokenClassifier};
use crate::error::{ConfigError, Result};

/// Limiar padrão: entidades têm pelo menos duas palavras.
pub const DEFAULT_MIN_REPETITIONS: usize = 2;

/// Uma sequência que atingiu o limiar e foi emitida como entidade.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRun {
    /// Tokens da sequência unidos por um espaço.
    pub text: String,
    /// Quantidade de tokens na sequência.
    pub token_count: usize,
}

/// Extrator configurado com um classificador e um limiar mínimo.
///
/// Cada instância é independente e imutável; chamadas sucessivas a `extract`
/// sobre os mesmos tokens sempre produzem o mesmo conjunto.
#[derive(Debug, Clone)]
pub struct EntityExtractor<C = ShapeClassifier> {
    classifier: C,
    min_repetitions: usize,
}

impl<C: TokenClassifier> EntityExtractor<C> {
    /// Cria um extrator, validando o limiar de imediato.
    ///
    /// `min_repetitions == 0` retorna [`ConfigError::InvalidMinRepetitions`].
    pub fn new(classifier: C, min_repetitions: usize) -> Result<Self> {
        if min_repetitions < 1 {
            return Err(ConfigError::InvalidMinRepetitions {
                got: min_repetitions,
            });
        }
        Ok(Self {
            classifier,
            min_repetitions,
        })
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn min_repetitions(&self) -> usize {
        self.min_repetitions
    }

    /// Iterador preguiçoso sobre as sequências emitidas, na ordem do fluxo.
    ///
    /// Ao contrário de [`extract`](Self::extract), não deduplica: uma entidade
    /// que aparece duas vezes no texto é emitida duas vezes. O consumidor pode
    /// parar de puxar a qualquer momento.
    pub fn runs<I>(&self, tokens: I) -> EntityRuns<'_, C, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        EntityRuns {
            extractor: self,
            tokens: tokens.into_iter(),
            state: RunState::Outside,
            finished: false,
        }
    }

    /// Extrai o conjunto de entidades distintas de uma sequência de tokens.
    pub fn extract<I>(&self, tokens: I) -> HashSet<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.runs(tokens).map(|run| run.text).collect()
    }
}

impl EntityExtractor<ShapeClassifier> {
    /// Extrator com o classificador padrão ("palavra capitalizada", ASCII).
    pub fn with_default_classifier(min_repetitions: usize) -> Result<Self> {
        Self::new(ShapeClassifier::default(), min_repetitions)
    }
}

impl Default for EntityExtractor<ShapeClassifier> {
    fn default() -> Self {
        Self {
            classifier: ShapeClassifier::default(),
            min_repetitions: DEFAULT_MIN_REPETITIONS,
        }
    }
}

/// Extrai entidades com a configuração padrão (capitalizadas, limiar 2).
pub fn extract_entities<I>(tokens: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let extractor: EntityExtractor = EntityExtractor::default();
    extractor.extract(tokens)
}

/// Estado da máquina: fora de uma sequência ou acumulando uma.
#[derive(Debug)]
enum RunState {
    Outside,
    Inside { text: String, len: usize },
}

impl RunState {
    fn push(&mut self, token: &str) {
        match self {
            RunState::Outside => {
                *self = RunState::Inside {
                    text: token.to_owned(),
                    len: 1,
                }
            }
            RunState::Inside { text, len } => {
                text.push(' ');
                text.push_str(token);
                *len += 1;
            }
        }
    }
}

/// Iterador retornado por [`EntityExtractor::runs`].
#[derive(Debug)]
pub struct EntityRuns<'e, C, I> {
    extractor: &'e EntityExtractor<C>,
    tokens: I,
    state: RunState,
    finished: bool,
}

impl<C, I> EntityRuns<'_, C, I> {
    /// Volta para FORA, devolvendo a sequência descartada se ela atingir o limiar.
    fn close_run(&mut self) -> Option<EntityRun> {
        match mem::replace(&mut self.state, RunState::Outside) {
            RunState::Inside { text, len } if len >= self.extractor.min_repetitions => Some(EntityRun {
                text,
                token_count: len,
            }),
            _ => None,
        }
    }
}

impl<C, I> Iterator for EntityRuns<'_, C, I>
where
    C: TokenClassifier,
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = EntityRun;

    fn next(&mut self) -> Option<EntityRun> {
        if self.finished {
            return None;
        }
        loop {
            let Some(token) = self.tokens.next() else {
                // Transição implícita de fim de fluxo
                self.finished = true;
                return self.close_run();
            };
            let token = token.as_ref();
            if self.extractor.classifier.is_entity_part(token) {
                self.state.push(token);
            } else if let Some(run) = self.close_run() {
                return Some(run);
            }
        }
    }
}

impl<C, I> FusedIterator for EntityRuns<'_, C, I>
where
    C: TokenClassifier,
    I: Iterator,
    I::Item: AsRef<str>,
{
}
