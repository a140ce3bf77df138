//! Prompt assembly for a single model turn

use crate::domain::retrieval::Passage;

const DOCS_BEGIN: &str = "--- BEGIN DOCS ---";
const DOCS_END: &str = "--- END DOCS ---";

/// Assemble the final prompt for one model turn.
///
/// Pure function of its inputs: the same query and passages always produce a
/// byte-identical prompt. An empty passage slice renders no documents block
/// at all, so prompts never carry dangling markers.
pub fn assemble(query: &str, passages: &[Passage]) -> String {
    let mut prompt = format!(
        "You are a helpful assistant who responds in short concise, \
         but accurate statements. How would you respond to the following \
         user query: \n\n{query}"
    );

    if !passages.is_empty() {
        prompt.push_str(&format!(
            "\n\n{DOCS_BEGIN}\n\nAdditionally, I found the following documents \
             that may be relevant to this inquiry:"
        ));

        for (idx, passage) in passages.iter().enumerate() {
            prompt.push_str(&format!("\n\n{}:\n{}", idx + 1, passage.text));
        }

        prompt.push_str(&format!("\n\n{DOCS_END}\n\n"));
    }

    prompt.push_str(
        "\n\nPlease provide a response concisely to the original user query \
         above. You can let the user know if you are not certain of the answer.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages(n: usize) -> Vec<Passage> {
        (0..n)
            .map(|i| Passage::new(format!("passage number {i}"), 1.0 - i as f32 * 0.05))
            .collect()
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let docs = passages(3);
        let first = assemble("What is X?", &docs);
        let second = assemble("What is X?", &docs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_prompt_contains_query() {
        let prompt = assemble("What is X?", &[]);
        assert!(prompt.contains("What is X?"));
    }

    #[test]
    fn test_no_markers_without_passages() {
        let prompt = assemble("What is X?", &[]);
        assert!(!prompt.contains(DOCS_BEGIN));
        assert!(!prompt.contains(DOCS_END));
    }

    #[test]
    fn test_docs_block_enumerates_passages() {
        let prompt = assemble("What is X?", &passages(3));

        assert!(prompt.contains(DOCS_BEGIN));
        assert!(prompt.contains(DOCS_END));
        assert!(prompt.contains("1:\npassage number 0"));
        assert!(prompt.contains("2:\npassage number 1"));
        assert!(prompt.contains("3:\npassage number 2"));
    }

    #[test]
    fn test_markers_are_balanced() {
        let prompt = assemble("query", &passages(1));
        assert_eq!(prompt.matches(DOCS_BEGIN).count(), 1);
        assert_eq!(prompt.matches(DOCS_END).count(), 1);
    }

    #[test]
    fn test_closing_instruction_always_present() {
        for docs in [passages(0), passages(2)] {
            let prompt = assemble("query", &docs);
            assert!(prompt.ends_with("not certain of the answer."));
        }
    }
}
