//! # Textos de Demonstração
//!
//! Pequenos textos usados pelo servidor web (`/demo-texts`) e pelos testes.
//! Cada um exercita um aspecto da regra ingênua: sequências longas, siglas,
//! palavras no início de frase e nomes com preposições.

/// Retorna pares (rótulo, texto) para demonstração.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Viagem",
            "When we went to Los Angeles last year we visited the Hollywood Sign",
        ),
        (
            "Sequência longa",
            "The tour ended at the Golden Gate Bridge before we drove back to San Francisco.",
        ),
        (
            "Siglas",
            "Engineers from NASA and the JPL met researchers at the Max Planck Institute.",
        ),
        (
            "Início de frase",
            "Yesterday it rained. Then Mary Ann Jones called from Buenos Aires.",
        ),
        (
            "Preposições",
            "Tourists love the Statue of Liberty near the Hudson River in New York.",
        ),
        (
            "Acentos",
            "Fomos de São Paulo a Zürich e depois a Côte d'Ivoire.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_entities;
    use crate::tokenizer::tokenize;

    fn entities_of(label: &str) -> Vec<String> {
        let (_, text) = demo_texts()
            .into_iter()
            .find(|(l, _)| *l == label)
            .unwrap();
        let mut entities: Vec<String> = extract_entities(tokenize(text)).into_iter().collect();
        entities.sort();
        entities
    }

    #[test]
    fn test_demo_labels_are_unique() {
        let texts = demo_texts();
        let mut labels: Vec<&str> = texts.iter().map(|(l, _)| *l).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), texts.len());
    }

    #[test]
    fn test_sentence_initial_words_join_runs() {
        // A regra é ingênua: "Then" é capitalizado e emenda com o nome seguinte
        assert_eq!(entities_of("Início de frase"), ["Buenos Aires", "Then Mary Ann Jones"]);
    }

    #[test]
    fn test_prepositions_break_runs() {
        assert_eq!(entities_of("Preposições"), ["Hudson River", "New York"]);
    }

    #[test]
    fn test_acronyms_break_runs() {
        assert_eq!(entities_of("Siglas"), ["Max Planck Institute"]);
    }
}
