//! Parsing of analyzer output.

/// Marks an analysis the analyzer could not produce.
pub const FAILURE_MARK: &str = "+?";
/// Opens a derivational suffix tag.
pub const DERIVATION_MARK: &str = "[_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub surface: String,
    pub analysis: String,
}

impl Candidate {
    pub fn is_failure(&self) -> bool {
        self.analysis.contains(FAILURE_MARK)
    }

    pub fn is_derived(&self) -> bool {
        self.analysis.contains(DERIVATION_MARK)
    }
}

/// All candidate analyses of one input token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerBlock {
    pub surface: String,
    pub candidates: Vec<Candidate>,
}

impl AnalyzerBlock {
    /// The analyzer found nothing for this token.
    pub fn is_unanalyzed(&self) -> bool {
        self.candidates.iter().any(Candidate::is_failure)
    }

    /// Drops candidates with derivational suffixes, unless that would drop
    /// them all.
    pub fn without_derivations(self) -> Self {
        if self.candidates.iter().all(Candidate::is_derived) {
            return self;
        }
        Self {
            surface: self.surface,
            candidates: self
                .candidates
                .into_iter()
                .filter(|candidate| !candidate.is_derived())
                .collect(),
        }
    }
}

fn parse_candidate(line: &str) -> Option<Candidate> {
    let mut fields = line.split('\t');
    let surface = fields.next()?;
    let analysis = fields.next()?;
    let _weight = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Candidate {
        surface: surface.to_string(),
        analysis: analysis.to_string(),
    })
}

fn parse_block(block: &str) -> AnalyzerBlock {
    let candidates: Vec<Candidate> = block.lines().filter_map(parse_candidate).collect();
    let surface = match candidates.first() {
        Some(candidate) => candidate.surface.clone(),
        None => block
            .lines()
            .next()
            .and_then(|line| line.split('\t').next())
            .unwrap_or_default()
            .to_string(),
    };
    AnalyzerBlock {
        surface,
        candidates,
    }
}

/// Split analyzer output into one block per input token.
pub fn parse_output(output: &str) -> Vec<AnalyzerBlock> {
    output
        .replace("\r\n", "\n")
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(parse_block)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OUTPUT: &str = "Háznak\tház[N][Dat]\t0,000000\nHáznak\tház[N]nak[_Der]\t1,000000\n\n\
néktek\tnéktek+?\tinf\n\n\
[EOL]\t[EOL]+?\tinf\n\n";

    #[test]
    fn test_parse_output_blocks() {
        let blocks = parse_output(OUTPUT);

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].surface, "Háznak");
        assert_eq!(blocks[0].candidates.len(), 2);
        assert!(!blocks[0].is_unanalyzed());
        assert!(blocks[1].is_unanalyzed());
        assert_eq!(blocks[2].surface, "[EOL]");
    }

    #[test]
    fn test_derived_candidates_are_dropped() {
        let block = parse_output(OUTPUT).remove(0).without_derivations();
        let analyses: Vec<&str> = block.candidates.iter().map(|c| c.analysis.as_str()).collect();
        assert_eq!(analyses, vec!["ház[N][Dat]"]);
    }

    #[test]
    fn test_only_derived_candidates_are_kept() {
        let block = parse_output("szépség\tszép[Adj]ség[_Abstr/N][Nom]\t0\n\n")
            .remove(0)
            .without_derivations();
        assert_eq!(block.candidates.len(), 1);
    }

    #[test]
    fn test_lines_without_three_fields_are_ignored() {
        let block = parse_output("alma\talma[N][Nom]\nalma\talma[N][Nom]\t0\textra\n\n").remove(0);
        assert!(block.candidates.is_empty());
        assert_eq!(block.surface, "alma");
    }
}
