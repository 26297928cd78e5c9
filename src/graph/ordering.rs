//! Vertex ordering by mention priority class.

use crate::mention::Mention;

/// Solving order for a document's mentions.
///
/// Returns detection-order positions grouped by priority class (proper
/// nouns, then noun phrases/composites/verb phrases, then pronouns). The
/// sort is stable, so detection order is preserved inside each class.
/// The position of an entry in the result is its vertex index.
#[must_use]
pub fn solving_order(mentions: &[Mention]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..mentions.len()).collect();
    order.sort_by_key(|&pos| mentions[pos].kind.priority_class());
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::{MentionId, MentionKind};

    fn mention(id: u32, kind: MentionKind) -> Mention {
        Mention::new(MentionId::new(id), kind, 0, id, id)
    }

    #[test]
    fn groups_by_class_and_keeps_detection_order() {
        let mentions = vec![
            mention(0, MentionKind::Pronoun),
            mention(1, MentionKind::NounPhrase),
            mention(2, MentionKind::ProperNoun),
            mention(3, MentionKind::VerbPhrase),
            mention(4, MentionKind::Pronoun),
            mention(5, MentionKind::Composite),
            mention(6, MentionKind::ProperNoun),
        ];

        assert_eq!(solving_order(&mentions), vec![2, 6, 1, 3, 5, 0, 4]);
    }

    #[test]
    fn empty_document_has_empty_order() {
        assert!(solving_order(&[]).is_empty());
    }
}
