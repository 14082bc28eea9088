//! Measuring how much a code map saves.
//!
//! Token counts come from tiktoken-rs (OpenAI-compatible BPE). If a
//! tokenizer cannot be loaded, a four-characters-per-token estimate is used
//! so statistics never fail.

use std::ops::AddAssign;
use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;

/// Token encoding to use for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// cl100k_base: GPT-4, GPT-3.5-turbo
    #[default]
    Cl100kBase,
    /// o200k_base: GPT-4o
    O200kBase,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Cl100kBase => f.write_str("cl100k_base"),
            Encoding::O200kBase => f.write_str("o200k_base"),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cl100k" | "cl100k_base" => Ok(Encoding::Cl100kBase),
            "o200k" | "o200k_base" => Ok(Encoding::O200kBase),
            _ => Err(format!("unknown encoding: {s}")),
        }
    }
}

static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static O200K: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn tokenizer(encoding: Encoding) -> Option<&'static CoreBPE> {
    let cell = match encoding {
        Encoding::Cl100kBase => &CL100K,
        Encoding::O200kBase => &O200K,
    };
    cell.get_or_init(|| {
        let loaded = match encoding {
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
        };
        loaded
            .map_err(|err| tracing::warn!(%encoding, error = %err, "tokenizer unavailable, estimating"))
            .ok()
    })
    .as_ref()
}

fn estimate(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Count tokens in `text`.
///
/// # Examples
///
/// ```
/// use condense::tokens::{count_tokens, Encoding};
///
/// assert!(count_tokens("fn main() {}", Encoding::Cl100kBase) > 0);
/// ```
pub fn count_tokens(text: &str, encoding: Encoding) -> usize {
    match tokenizer(encoding) {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => estimate(text),
    }
}

/// Number of lines, counting a final unterminated line.
pub fn count_lines(text: &str) -> usize {
    let newlines = bytecount::count(text.as_bytes(), b'\n');
    if text.is_empty() || text.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

/// Size of a source text and of its code map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reduction {
    pub files: usize,
    pub source_tokens: usize,
    pub map_tokens: usize,
    pub source_lines: usize,
    pub map_lines: usize,
}

impl Reduction {
    /// Measure one file.
    pub fn measure(source: &str, map: &str, encoding: Encoding) -> Self {
        Self {
            files: 1,
            source_tokens: count_tokens(source, encoding),
            map_tokens: count_tokens(map, encoding),
            source_lines: count_lines(source),
            map_lines: count_lines(map),
        }
    }

    /// Fraction of source tokens removed, in `0.0..=1.0`.
    pub fn saved_ratio(&self) -> f64 {
        if self.source_tokens == 0 || self.map_tokens >= self.source_tokens {
            return 0.0;
        }
        (self.source_tokens - self.map_tokens) as f64 / self.source_tokens as f64
    }
}

impl AddAssign for Reduction {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.source_tokens += other.source_tokens;
        self.map_tokens += other.map_tokens;
        self.source_lines += other.source_lines;
        self.map_lines += other.map_lines;
    }
}

impl std::iter::Sum for Reduction {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Reduction::default(), |mut acc, r| {
            acc += r;
            acc
        })
    }
}

impl std::fmt::Display for Reduction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files: {} -> {} tokens, {} -> {} lines ({:.1}% fewer tokens)",
            format_number(self.files),
            format_number(self.source_tokens),
            format_number(self.map_tokens),
            format_number(self.source_lines),
            format_number(self.map_lines),
            self.saved_ratio() * 100.0
        )
    }
}

/// Format with thousands separators.
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() {
        assert_eq!(count_tokens("", Encoding::Cl100kBase), 0);
    }

    #[test]
    fn test_simple_text() {
        let count = count_tokens("Hello, world!", Encoding::Cl100kBase);
        assert!(count > 0 && count < 10);
    }

    #[test]
    fn test_estimate() {
        assert_eq!(estimate(""), 0);
        assert_eq!(estimate("a"), 1);
        assert_eq!(estimate("abcd"), 1);
        assert_eq!(estimate("abcde"), 2);
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("cl100k".parse::<Encoding>().unwrap(), Encoding::Cl100kBase);
        assert_eq!("O200K_BASE".parse::<Encoding>().unwrap(), Encoding::O200kBase);
        assert!("p50k".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("one"), 1);
        assert_eq!(count_lines("one\n"), 1);
        assert_eq!(count_lines("one\ntwo"), 2);
    }

    #[test]
    fn test_reduction_measure() {
        let source = "func main() {\n\tfmt.Println(\"a fairly long greeting for everyone\")\n}\n";
        let map = "func main()";
        let r = Reduction::measure(source, map, Encoding::Cl100kBase);
        assert_eq!(r.files, 1);
        assert_eq!(r.source_lines, 3);
        assert_eq!(r.map_lines, 1);
        assert!(r.map_tokens < r.source_tokens);
        assert!(r.saved_ratio() > 0.0 && r.saved_ratio() < 1.0);
    }

    #[test]
    fn test_reduction_sum() {
        let a = Reduction { files: 1, source_tokens: 100, map_tokens: 20, source_lines: 10, map_lines: 2 };
        let b = Reduction { files: 1, source_tokens: 50, map_tokens: 30, source_lines: 5, map_lines: 3 };
        let total: Reduction = [a, b].into_iter().sum();
        assert_eq!(total.files, 2);
        assert_eq!(total.source_tokens, 150);
        assert_eq!(total.map_tokens, 50);
    }

    #[test]
    fn test_saved_ratio_never_negative() {
        let r = Reduction { files: 1, source_tokens: 10, map_tokens: 12, source_lines: 1, map_lines: 1 };
        assert_eq!(r.saved_ratio(), 0.0);
        assert_eq!(Reduction::default().saved_ratio(), 0.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
