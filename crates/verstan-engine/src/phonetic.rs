//! Phonetic transcription of every word.

use log::debug;

use crate::model::StanzaSet;
use crate::tools::{ToolError, Transcriber};

/// Collapse transcriber output into a single token.
fn clean_transcription(raw: &str) -> String {
    raw.replace('\n', " ").replace(' ', "")
}

/// Transcribe every word of the unit; returns the number of words done.
pub fn transcribe<S: StanzaSet + ?Sized>(unit: &mut S, transcriber: &dyn Transcriber) -> Result<usize, ToolError> {
    let mut count = 0;
    for word in unit.words_mut() {
        let surface = word.word_text.strip_prefix('-').unwrap_or(&word.word_text);
        let raw = transcriber.transcribe(surface)?;
        word.word_ipa_espeak = Some(clean_transcription(&raw));
        count += 1;
    }
    debug!("Transcribed {count} words");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PoemMeta, Word};
    use crate::segment::segment_poem;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct Recorder {
        seen: RefCell<Vec<String>>,
    }

    impl Transcriber for Recorder {
        fn transcribe(&self, word: &str) -> Result<String, ToolError> {
            self.seen.borrow_mut().push(word.to_string());
            Ok(format!(" {} \n", word.to_lowercase()))
        }
    }

    #[test]
    fn test_transcribe_words() {
        let mut poem = segment_poem("Szép -hon", PoemMeta::default());
        let recorder = Recorder {
            seen: RefCell::new(Vec::new()),
        };

        let count = transcribe(&mut poem, &recorder).unwrap();

        assert_eq!(count, 2);
        assert_eq!(*recorder.seen.borrow(), vec!["Szép", "hon"]);
        let ipa: Vec<Option<String>> = poem.words().map(|w: &Word| w.word_ipa_espeak.clone()).collect();
        assert_eq!(ipa, vec![Some("szép".to_string()), Some("hon".to_string())]);
    }

    #[test]
    fn test_clean_transcription() {
        assert_eq!(clean_transcription("sˈeːp\n hˈon\n"), "sˈeːphˈon");
    }
}
