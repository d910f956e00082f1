use thiserror::Error;

pub const MIN_PROOF_CHARS: usize = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("too short: describe what you studied in at least {min} characters ({got} so far)")]
    TooShort { got: usize, min: usize },
}

/// Notes accepted as proof that a session was actually studied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOfStudy {
    text: String,
}

impl ProofOfStudy {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Counts characters of the trimmed text, not bytes.
pub fn trimmed_len(text: &str) -> usize {
    text.trim().chars().count()
}

pub fn validate(text: &str) -> Result<ProofOfStudy, ProofError> {
    let got = trimmed_len(text);
    if got < MIN_PROOF_CHARS {
        return Err(ProofError::TooShort {
            got,
            min: MIN_PROOF_CHARS,
        });
    }

    Ok(ProofOfStudy {
        text: text.trim().to_string(),
    })
}
