//! Parsing of tagger output.

/// A raw `surface#lemma#tag` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub surface: String,
    pub lemma: String,
    pub tag: String,
}

/// The reading of one tagger token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenReading {
    Accepted { lemma: String, morphology: String },
    /// The tagger fell back to a guess it marks as uncertain.
    Rejected(TaggedToken),
    /// Not three `#`-separated fields.
    Malformed(String),
}

/// All tokens of the output, sentence boundaries dropped.
pub fn parse_tokens(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .flat_map(str::split_whitespace)
        .collect()
}

pub fn read_token(token: &str) -> TokenReading {
    let fields: Vec<&str> = token.split('#').collect();
    let [surface, lemma, tag] = fields.as_slice() else {
        return TokenReading::Malformed(token.to_string());
    };

    if tag.contains('?') {
        return TokenReading::Rejected(TaggedToken {
            surface: surface.to_string(),
            lemma: lemma.to_string(),
            tag: tag.to_string(),
        });
    }

    TokenReading::Accepted {
        lemma: lemma.to_string(),
        morphology: explode_tag(tag),
    }
}

/// `[N:Poss.3Sg:Nom]` → `[N][Poss.3Sg][Nom]`.
pub fn explode_tag(tag: &str) -> String {
    let inner = if tag.chars().count() > 1 && tag.contains('[') {
        strip_outer(tag)
    } else {
        tag
    };

    inner
        .split(':')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("[{segment}]"))
        .collect()
}

fn strip_outer(tag: &str) -> &str {
    let mut chars = tag.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}
