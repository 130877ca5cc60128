//! # capner-core — Entidades Nomeadas por Sequências Capitalizadas
//!
//! Este crate implementa uma definição propositalmente ingênua de entidade
//! nomeada: **uma sequência máxima de duas ou mais palavras capitalizadas
//! consecutivas**. "Los Angeles" é uma entidade; "our hotel" não é.
//!
//! ## Arquitetura do Sistema
//!
//! O pipeline tem dois estágios:
//!
//! 1.  **Tokenização** ([`tokenizer`]): o texto vira um iterador preguiçoso de
//!     sequências de letras. Pontuação, dígitos e espaços são descartados.
//! 2.  **Extração** ([`extractor`]): os tokens aprovados pelo [`classifier`]
//!     são agrupados em sequências consecutivas; as que atingem o limiar
//!     `min_repetitions` viram entidades, deduplicadas num conjunto.
//!
//! O [`pipeline`] combina os dois estágios a partir de uma configuração
//! serializável e oferece variantes em streaming e em lote.
//!
//! Não há tratamento linguístico: palavras capitalizadas no início de frase
//! contam como qualquer outra, e preposições ("Statue of Liberty") quebram a
//! sequência.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use capner_core::{extract_entities, tokenize};
//!
//! let text = "When we went to Los Angeles last year we visited the Hollywood Sign";
//! let entities = extract_entities(tokenize(text));
//!
//! assert_eq!(entities.len(), 2);
//! assert!(entities.contains("Los Angeles"));
//! assert!(entities.contains("Hollywood Sign"));
//! ```
//!
//! ## Módulos Principais
//!
//! - [`tokenizer`]: segmentação preguiçosa do texto.
//! - [`classifier`]: predicados que decidem se um token pode compor entidade.
//! - [`extractor`]: máquina de estados de agrupamento por sequências.
//! - [`pipeline`]: orquestração, eventos e processamento em lote.
//! - [`error`]: erros de configuração.

pub mod classifier;
pub mod corpus;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod tokenizer;

pub use classifier::{ClassifierKind, ShapeClassifier, TokenClassifier};
pub use error::ConfigError;
pub use extractor::{extract_entities, EntityExtractor, EntityRun, DEFAULT_MIN_REPETITIONS};
pub use pipeline::{EntityPipeline, PipelineConfig, PipelineEvent};
pub use tokenizer::{tokenize, Alphabet, Tokenizer, Tokens};
