//! # Pipeline — Tokenização + Extração com Eventos Observáveis
//!
//! O pipeline liga o [`Tokenizer`] ao [`EntityExtractor`] a partir de uma
//! [`PipelineConfig`] serializável. Além da análise síncrona, oferece:
//!
//! - **Streaming**: emite um [`PipelineEvent`] por token e por entidade via
//!   canal `mpsc`, para que o servidor WebSocket mostre o progresso ao cliente.
//! - **Lote**: processa vários textos em paralelo com `rayon`. Cada extração é
//!   independente, então a ordem da saída acompanha a ordem da entrada.

use std::collections::HashSet;
use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::classifier::{ClassifierKind, ShapeClassifier, TokenClassifier};
use crate::error::Result;
use crate::extractor::{EntityExtractor, DEFAULT_MIN_REPETITIONS};
use crate::tokenizer::{Alphabet, Tokenizer, Tokens};

/// Configuração do pipeline. Todos os campos têm valor padrão.
///
/// ```rust
/// use capner_core::pipeline::PipelineConfig;
///
/// let config = PipelineConfig::from_json(r#"{"classifier": "capitalized_or_acronym"}"#).unwrap();
/// assert_eq!(config.min_repetitions, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Quais caracteres contam como letras (tokenização e classificação).
    pub alphabet: Alphabet,
    /// Política de classificação de tokens.
    pub classifier: ClassifierKind,
    /// Tamanho mínimo de uma sequência para virar entidade.
    pub min_repetitions: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::default(),
            classifier: ClassifierKind::default(),
            min_repetitions: DEFAULT_MIN_REPETITIONS,
        }
    }
}

impl PipelineConfig {
    /// Lê a configuração de um documento JSON (campos ausentes usam o padrão).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Eventos emitidos durante a análise em streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// Um token foi lido do texto e classificado.
    TokenScanned {
        index: usize,
        token: String,
        qualifies: bool,
    },
    /// Uma sequência atingiu o limiar e foi emitida.
    EntityEmitted { text: String, token_count: usize },
    /// Fim da análise, com o conjunto final (ordenado para exibição).
    Done {
        entities: Vec<String>,
        total_tokens: usize,
        processing_ms: u64,
    },
}

/// Pipeline de extração: tokenizador + extrator, ambos imutáveis.
///
/// É `Send + Sync` e pode ser compartilhado entre threads via `Arc`.
#[derive(Debug, Clone)]
pub struct EntityPipeline {
    tokenizer: Tokenizer,
    extractor: EntityExtractor<ShapeClassifier>,
}

impl EntityPipeline {
    /// Monta o pipeline validando a configuração antes de qualquer texto.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let classifier = ShapeClassifier::from_kind(config.classifier, config.alphabet);
        let extractor = EntityExtractor::new(classifier, config.min_repetitions)?;
        debug!(
            alphabet = ?config.alphabet,
            classifier = ?config.classifier,
            min_repetitions = config.min_repetitions,
            "pipeline configurado"
        );
        Ok(Self {
            tokenizer: Tokenizer::new(config.alphabet),
            extractor,
        })
    }

    /// Pipeline com um classificador arbitrário baseado em padrão.
    pub fn with_pattern(alphabet: Alphabet, pattern: &str, min_repetitions: usize) -> Result<Self> {
        let classifier = ShapeClassifier::from_pattern(pattern)?;
        Ok(Self {
            tokenizer: Tokenizer::new(alphabet),
            extractor: EntityExtractor::new(classifier, min_repetitions)?,
        })
    }

    /// Monta o pipeline a partir de peças já construídas (por exemplo, um
    /// tokenizador de [`Tokenizer::from_pattern`]).
    pub fn new(tokenizer: Tokenizer, extractor: EntityExtractor<ShapeClassifier>) -> Self {
        Self { tokenizer, extractor }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn extractor(&self) -> &EntityExtractor<ShapeClassifier> {
        &self.extractor
    }

    /// Tokens do texto segundo o alfabeto configurado.
    pub fn tokens<'h>(&self, text: &'h str) -> Tokens<'h> {
        self.tokenizer.tokenize(text)
    }

    /// Conjunto de entidades distintas do texto.
    pub fn analyze(&self, text: &str) -> HashSet<String> {
        self.extractor.extract(self.tokens(text))
    }

    /// Como [`analyze`](Self::analyze), mas ordenado alfabeticamente.
    pub fn analyze_sorted(&self, text: &str) -> Vec<String> {
        let mut entities: Vec<String> = self.analyze(text).into_iter().collect();
        entities.sort();
        entities
    }

    /// Entidades ordenadas e o total de tokens, numa única passagem pelo texto.
    pub fn analyze_with_count(&self, text: &str) -> (Vec<String>, usize) {
        let mut total_tokens = 0;
        let counted = self.tokens(text).inspect(|_| total_tokens += 1);
        let mut entities: Vec<String> = self.extractor.extract(counted).into_iter().collect();
        entities.sort();
        (entities, total_tokens)
    }

    /// Analisa vários textos em paralelo; `result[i]` corresponde a `texts[i]`.
    pub fn analyze_batch<S>(&self, texts: &[S]) -> Vec<HashSet<String>>
    where
        S: AsRef<str> + Sync,
    {
        debug!(documents = texts.len(), "análise em lote");
        texts.par_iter().map(|text| self.analyze(text.as_ref())).collect()
    }

    /// Executa a análise enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `TokenScanned` para cada token, na ordem do texto.
    /// 2. `EntityEmitted` logo após o token que encerra a sequência (ou no fim).
    /// 3. `Done` com o conjunto final.
    ///
    /// Se o receptor for descartado, os envios seguintes são ignorados e a
    /// análise termina normalmente.
    pub fn analyze_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        let classifier = self.extractor.classifier();
        let mut total_tokens = 0;

        let scanned = self.tokens(text).enumerate().map(|(index, token)| {
            total_tokens = index + 1;
            let _ = tx.send(PipelineEvent::TokenScanned {
                index,
                token: token.to_string(),
                qualifies: classifier.is_entity_part(token),
            });
            token
        });

        let mut entities = HashSet::new();
        for run in self.extractor.runs(scanned) {
            trace!(entity = %run.text, tokens = run.token_count, "entidade emitida");
            let _ = tx.send(PipelineEvent::EntityEmitted {
                text: run.text.clone(),
                token_count: run.token_count,
            });
            entities.insert(run.text);
        }

        let mut entities: Vec<String> = entities.into_iter().collect();
        entities.sort();
        let _ = tx.send(PipelineEvent::Done {
            entities,
            total_tokens,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }
}

impl Default for EntityPipeline {
    fn default() -> Self {
        Self {
            tokenizer: Tokenizer::default(),
            extractor: EntityExtractor::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::demo_texts;
    use crate::error::ConfigError;

    const REFERENCE: &str = "When we went to Los Angeles last year we visited the Hollywood Sign";

    #[test]
    fn test_pipeline_basic() {
        let pipeline = EntityPipeline::default();
        assert_eq!(pipeline.analyze_sorted(REFERENCE), ["Hollywood Sign", "Los Angeles"]);
    }

    #[test]
    fn test_pipeline_empty() {
        let pipeline = EntityPipeline::default();
        assert!(pipeline.analyze("").is_empty());
        assert_eq!(pipeline.tokens("").count(), 0);
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_config_malformed_json() {
        let err = PipelineConfig::from_json(r#"{"alphabet": "klingon"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_zero_threshold_fails_before_processing() {
        let config = PipelineConfig {
            min_repetitions: 0,
            ..PipelineConfig::default()
        };
        let err = EntityPipeline::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMinRepetitions { got: 0 }));
    }

    #[test]
    fn test_acronym_config() {
        let config = PipelineConfig {
            classifier: ClassifierKind::CapitalizedOrAcronym,
            ..PipelineConfig::default()
        };
        let pipeline = EntityPipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.analyze_sorted("a visit to NASA JPL today"), ["NASA JPL"]);
        assert!(EntityPipeline::default().analyze("a visit to NASA JPL today").is_empty());
    }

    #[test]
    fn test_unicode_config() {
        let config = PipelineConfig {
            alphabet: Alphabet::Unicode,
            ..PipelineConfig::default()
        };
        let pipeline = EntityPipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.analyze_sorted("Moro em São Paulo desde ontem"), ["São Paulo"]);
        // Em ASCII o "ã" separa "S" de "o", e "S Paulo" não se forma
        assert!(EntityPipeline::default().analyze("Moro em São Paulo desde ontem").is_empty());
    }

    #[test]
    fn test_with_pattern() {
        let pipeline = EntityPipeline::with_pattern(Alphabet::Ascii, "[A-Z]{2,}", 2).unwrap();
        assert_eq!(pipeline.analyze_sorted("the FBI CIA and Los Angeles"), ["FBI CIA"]);
        assert!(EntityPipeline::with_pattern(Alphabet::Ascii, "(", 2).is_err());
    }

    #[test]
    fn test_analyze_with_count_single_pass() {
        let pipeline = EntityPipeline::default();
        for (_, text) in demo_texts() {
            let (entities, total_tokens) = pipeline.analyze_with_count(text);
            assert_eq!(entities, pipeline.analyze_sorted(text));
            assert_eq!(total_tokens, pipeline.tokens(text).count());
        }
        let (entities, total_tokens) = pipeline.analyze_with_count(REFERENCE);
        assert_eq!(entities, ["Hollywood Sign", "Los Angeles"]);
        assert_eq!(total_tokens, 13);
    }

    #[test]
    fn test_pipeline_with_pattern_tokenizer() {
        let tokenizer = Tokenizer::from_pattern(r"[A-Za-z']+").unwrap();
        let classifier = ShapeClassifier::from_pattern("[A-Z][a-z]*(?:'[A-Z][a-z]+)?").unwrap();
        let extractor = EntityExtractor::new(classifier, 2).unwrap();
        let pipeline = EntityPipeline::new(tokenizer, extractor);
        assert_eq!(pipeline.analyze_sorted("we met Conan O'Brien yesterday"), ["Conan O'Brien"]);
        // Com o tokenizador padrão o apóstrofo separa "O" de "Brien"
        assert_eq!(EntityPipeline::default().analyze_sorted("we met Conan O'Brien yesterday"), ["Conan O Brien"]);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let pipeline = EntityPipeline::default();
        let texts: Vec<&str> = demo_texts().iter().map(|(_, text)| *text).collect();
        let batch = pipeline.analyze_batch(&texts);
        assert_eq!(batch.len(), texts.len());
        for (text, entities) in texts.iter().zip(&batch) {
            assert_eq!(&pipeline.analyze(text), entities);
        }
    }

    #[test]
    fn test_pipeline_events_streaming() {
        let pipeline = EntityPipeline::default();
        let (tx, rx) = mpsc::channel();
        pipeline.analyze_streaming("We saw New York and then Boston.", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert_eq!(
            events[0],
            PipelineEvent::TokenScanned {
                index: 0,
                token: "We".to_string(),
                qualifies: true,
            }
        );

        let emitted: Vec<&PipelineEvent> = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::EntityEmitted { .. }))
            .collect();
        assert_eq!(emitted.len(), 1);
        // "and" fecha a sequência "New York" e é escaneado antes da emissão
        assert!(matches!(
            &events[5],
            PipelineEvent::EntityEmitted { text, token_count: 2 } if text == "New York"
        ));

        match events.last() {
            Some(PipelineEvent::Done { entities, total_tokens, .. }) => {
                assert_eq!(entities, &["New York".to_string()]);
                assert_eq!(*total_tokens, 7);
            }
            other => panic!("último evento deveria ser Done, veio {other:?}"),
        }
    }

    #[test]
    fn test_streaming_survives_dropped_receiver() {
        let pipeline = EntityPipeline::default();
        let (tx, rx) = mpsc::channel();
        drop(rx);
        pipeline.analyze_streaming(REFERENCE, tx);
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = PipelineEvent::EntityEmitted {
            text: "Los Angeles".to_string(),
            token_count: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "EntityEmitted");
        assert_eq!(json["data"]["text"], "Los Angeles");
    }

    #[test]
    fn test_pipeline_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EntityPipeline>();
    }
}
