use crate::error::CodecError;
use snip_core::{IdCodec, Token};
use typed_builder::TypedBuilder;

pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

const DEFAULT_SEPARATORS: &str = "cfhistuCFHISTU";
const SEPARATOR_RATIO: f64 = 3.5;
const GUARD_RATIO: f64 = 12.0;
const MIN_ALPHABET_LENGTH: usize = 16;

/// Settings for a [`HashidsCodec`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct CodecSettings {
    /// Secret salt. Tokens produced with one salt do not decode under another.
    #[builder(default, setter(into))]
    salt: String,
    /// Tokens shorter than this are padded up to it.
    #[builder(default = 0)]
    min_length: usize,
    #[builder(default = DEFAULT_ALPHABET.to_string(), setter(into))]
    alphabet: String,
}

/// A Hashids codec for a fixed salt, minimum length and alphabet.
///
/// Construction splits the alphabet into three disjoint sets: the working
/// alphabet digits are drawn from, separators placed between numbers, and
/// guards used to pad short tokens. All three are shuffled by the salt.
#[derive(Clone)]
pub struct HashidsCodec {
    salt: Vec<char>,
    min_length: usize,
    alphabet: Vec<char>,
    separators: Vec<char>,
    guards: Vec<char>,
}

impl HashidsCodec {
    pub fn new(settings: CodecSettings) -> Result<Self, CodecError> {
        let mut alphabet: Vec<char> = Vec::new();
        for c in settings.alphabet.chars() {
            if !alphabet.contains(&c) {
                alphabet.push(c);
            }
        }

        if alphabet.len() < MIN_ALPHABET_LENGTH {
            return Err(CodecError::AlphabetTooShort {
                min: MIN_ALPHABET_LENGTH,
                actual: alphabet.len(),
            });
        }

        if alphabet.iter().any(|c| c.is_whitespace()) {
            return Err(CodecError::AlphabetContainsWhitespace);
        }

        if let Some(&c) = alphabet.iter().find(|c| !is_url_safe(**c)) {
            return Err(CodecError::AlphabetNotUrlSafe(c));
        }

        let salt: Vec<char> = settings.salt.chars().collect();

        let mut separators: Vec<char> = DEFAULT_SEPARATORS
            .chars()
            .filter(|c| alphabet.contains(c))
            .collect();
        alphabet.retain(|c| !separators.contains(c));
        shuffle(&mut separators, &salt);

        if separators.is_empty()
            || alphabet.len() as f64 / separators.len() as f64 > SEPARATOR_RATIO
        {
            let mut wanted = (alphabet.len() as f64 / SEPARATOR_RATIO).ceil() as usize;
            if wanted == 1 {
                wanted += 1;
            }

            if wanted > separators.len() {
                let missing = wanted - separators.len();
                separators.extend(alphabet.drain(..missing));
            } else {
                separators.truncate(wanted);
            }
        }

        shuffle(&mut alphabet, &salt);

        let guard_count = (alphabet.len() as f64 / GUARD_RATIO).ceil() as usize;
        let guards = if alphabet.len() < 3 {
            separators.drain(..guard_count).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Ok(Self {
            salt,
            min_length: settings.min_length,
            alphabet,
            separators,
            guards,
        })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Returns true if `c` may appear in a token produced by this codec.
    pub fn is_token_char(&self, c: char) -> bool {
        self.alphabet.contains(&c) || self.separators.contains(&c) || self.guards.contains(&c)
    }

    fn encode_numbers(&self, numbers: &[u64]) -> String {
        let number_hash: u64 = numbers
            .iter()
            .enumerate()
            .map(|(i, n)| n % (i as u64 + 100))
            .sum();

        let mut alphabet = self.alphabet.clone();
        let lottery = alphabet[(number_hash % alphabet.len() as u64) as usize];

        let mut out = vec![lottery];
        let mut buffer = Vec::with_capacity(1 + self.salt.len() + alphabet.len());

        for (i, &number) in numbers.iter().enumerate() {
            buffer.clear();
            buffer.push(lottery);
            buffer.extend_from_slice(&self.salt);
            buffer.extend_from_slice(&alphabet);
            let len = alphabet.len();
            shuffle(&mut alphabet, &buffer[..len]);

            let digits = hash(number, &alphabet);
            let first = digits[0] as u64;
            out.extend_from_slice(&digits);

            if i + 1 < numbers.len() {
                let reduced = number % (first + i as u64);
                let index = (reduced % self.separators.len() as u64) as usize;
                out.push(self.separators[index]);
            }
        }

        if out.len() < self.min_length {
            let index = ((number_hash + out[0] as u64) % self.guards.len() as u64) as usize;
            out.insert(0, self.guards[index]);

            if out.len() < self.min_length {
                let index = ((number_hash + out[2] as u64) % self.guards.len() as u64) as usize;
                out.push(self.guards[index]);
            }
        }

        let half = alphabet.len() / 2;
        while out.len() < self.min_length {
            let key = alphabet.clone();
            shuffle(&mut alphabet, &key);

            let mut padded = Vec::with_capacity(alphabet.len() + out.len());
            padded.extend_from_slice(&alphabet[half..]);
            padded.extend_from_slice(&out);
            padded.extend_from_slice(&alphabet[..half]);
            out = padded;

            if out.len() > self.min_length {
                let start = (out.len() - self.min_length) / 2;
                out = out[start..start + self.min_length].to_vec();
            }
        }

        out.into_iter().collect()
    }

    fn decode_numbers(&self, token: &str) -> Option<Vec<u64>> {
        if token.is_empty() {
            return None;
        }

        let chars: Vec<char> = token.chars().collect();
        let mut parts: Vec<&[char]> = chars.split(|c| self.guards.contains(c)).collect();
        while parts.len() > 1 && parts.last().is_some_and(|part| part.is_empty()) {
            parts.pop();
        }

        let index = if parts.len() == 2 || parts.len() == 3 { 1 } else { 0 };
        let (&lottery, body) = parts.get(index)?.split_first()?;

        let mut alphabet = self.alphabet.clone();
        let mut buffer = Vec::with_capacity(1 + self.salt.len() + alphabet.len());
        let mut numbers = Vec::new();

        for chunk in body.split(|c| self.separators.contains(c)) {
            buffer.clear();
            buffer.push(lottery);
            buffer.extend_from_slice(&self.salt);
            buffer.extend_from_slice(&alphabet);
            let len = alphabet.len();
            shuffle(&mut alphabet, &buffer[..len]);

            numbers.push(unhash(chunk, &alphabet)?);
        }

        // Only tokens this codec would have produced itself are accepted.
        if self.encode_numbers(&numbers) != token {
            return None;
        }

        Some(numbers)
    }
}

impl IdCodec for HashidsCodec {
    fn encode(&self, id: u64) -> Token {
        Token::new_unchecked(self.encode_numbers(&[id]))
    }

    fn decode(&self, token: &str) -> Option<u64> {
        match self.decode_numbers(token)?.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }
}

impl std::fmt::Debug for HashidsCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashidsCodec")
            .field("salt", &"<redacted>")
            .field("min_length", &self.min_length)
            .finish_non_exhaustive()
    }
}

/// RFC 3986 unreserved characters: a token made of these is a single,
/// unescaped path segment.
fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

/// Salt-keyed deterministic shuffle.
fn shuffle(alphabet: &mut [char], salt: &[char]) {
    if salt.is_empty() {
        return;
    }

    let mut v = 0;
    let mut p = 0;
    for i in (1..alphabet.len()).rev() {
        v %= salt.len();
        let integer = salt[v] as usize;
        p += integer;
        let j = (integer + v + p) % i;
        alphabet.swap(i, j);
        v += 1;
    }
}

fn hash(mut number: u64, alphabet: &[char]) -> Vec<char> {
    let base = alphabet.len() as u64;
    let mut digits = Vec::new();
    loop {
        digits.push(alphabet[(number % base) as usize]);
        number /= base;
        if number == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}

fn unhash(digits: &[char], alphabet: &[char]) -> Option<u64> {
    let base = alphabet.len() as u64;
    digits.iter().try_fold(0_u64, |acc, c| {
        let position = alphabet.iter().position(|a| a == c)? as u64;
        acc.checked_mul(base)?.checked_add(position)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(salt: &str, min_length: usize) -> HashidsCodec {
        HashidsCodec::new(
            CodecSettings::builder()
                .salt(salt)
                .min_length(min_length)
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn matches_reference_vectors() {
        let codec = codec("this is my salt", 0);
        assert_eq!(codec.encode(12345).as_str(), "NkK9");
        assert_eq!(codec.encode_numbers(&[1, 2, 3]), "laHquq");
        assert_eq!(codec.encode_numbers(&[683, 94108, 123, 5]), "aBMswoO2UB3Sj");

        let padded = self::codec("this is my salt", 8);
        assert_eq!(padded.encode(1).as_str(), "gB0NV05e");
    }

    #[test]
    fn round_trips() {
        for min_length in [0, 4, 8, 20] {
            let codec = codec("my-secret-salt", min_length);
            let ids = (0..2_000).chain([
                99_999,
                1 << 32,
                i64::MAX as u64,
                u64::MAX - 1,
                u64::MAX,
            ]);
            for id in ids {
                let token = codec.encode(id);
                assert_eq!(codec.decode(token.as_str()), Some(id), "token {token}");
            }
        }
    }

    #[test]
    fn tokens_respect_min_length_and_alphabet() {
        for min_length in [0, 1, 4, 8, 20, 64] {
            let codec = codec("my-secret-salt", min_length);
            for id in [0, 1, 7, 100, 4_096, 1_000_000, u64::MAX] {
                let token = codec.encode(id);
                assert!(token.as_str().len() >= min_length, "token {token}");
                assert!(token.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
                assert!(token.as_str().chars().all(|c| codec.is_token_char(c)));
            }
        }
    }

    #[test]
    fn consecutive_ids_do_not_look_consecutive() {
        let codec = codec("my-secret-salt", 6);
        let a = codec.encode(1);
        let b = codec.encode(2);
        let c = codec.encode(3);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn decode_rejects_malformed_tokens() {
        let codec = codec("my-secret-salt", 4);
        assert_eq!(codec.decode(""), None);
        assert_eq!(codec.decode("!!!!"), None);
        assert_eq!(codec.decode("abc/def"), None);
        assert_eq!(codec.decode("a b c d"), None);
        assert_eq!(codec.decode(&"z".repeat(200)), None);
    }

    #[test]
    fn decode_rejects_tampered_tokens() {
        let codec = codec("my-secret-salt", 8);
        let token = codec.encode(42).into_string();

        assert_eq!(codec.decode(&format!("{token}x")), None);
        assert_eq!(codec.decode(&token[1..]), None);
    }

    #[test]
    fn decode_rejects_foreign_salt() {
        let ours = codec("my-secret-salt", 8);
        let theirs = codec("someone-elses-salt", 8);

        for id in [1, 42, 12345] {
            let token = theirs.encode(id);
            assert_eq!(ours.decode(token.as_str()), None, "token {token}");
        }
    }

    #[test]
    fn decode_rejects_multi_number_tokens() {
        let codec = codec("my-secret-salt", 0);
        let token = codec.encode_numbers(&[1, 2]);
        assert_eq!(codec.decode_numbers(&token), Some(vec![1, 2]));
        assert_eq!(codec.decode(&token), None);
    }

    #[test]
    fn same_settings_are_deterministic() {
        let a = codec("my-secret-salt", 8);
        let b = codec("my-secret-salt", 8);
        assert_eq!(a.encode(987_654), b.encode(987_654));
    }

    #[test]
    fn custom_alphabet() {
        let codec = HashidsCodec::new(
            CodecSettings::builder()
                .salt("my-secret-salt")
                .alphabet("0123456789abcdef")
                .build(),
        )
        .unwrap();

        for id in [0, 1, 255, 1_234_567] {
            let token = codec.encode(id);
            assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(codec.decode(token.as_str()), Some(id));
        }
    }

    #[test]
    fn rejects_short_alphabet() {
        let err = HashidsCodec::new(CodecSettings::builder().alphabet("abcdefg").build())
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::AlphabetTooShort {
                min: MIN_ALPHABET_LENGTH,
                actual: 7
            }
        );
    }

    #[test]
    fn duplicate_alphabet_characters_do_not_count() {
        let err = HashidsCodec::new(CodecSettings::builder().alphabet("aaaaaaaaaaaaaaaaaaaa").build())
            .unwrap_err();
        assert!(matches!(err, CodecError::AlphabetTooShort { actual: 1, .. }));
    }

    #[test]
    fn rejects_whitespace_in_alphabet() {
        let err = HashidsCodec::new(
            CodecSettings::builder()
                .alphabet("abcdefghijklmnop qrstuvwxyz")
                .build(),
        )
        .unwrap_err();
        assert_eq!(err, CodecError::AlphabetContainsWhitespace);
    }

    #[test]
    fn rejects_url_unsafe_alphabet() {
        for alphabet in [
            "abcdefghijklmnop/",
            "abcdefghijklmnop?",
            "abcdefghijklmnop#",
            "abcdefghijklmnop%",
            "abcdefghijklmnop&",
            "abcdefghijklmnopé",
        ] {
            let err = HashidsCodec::new(CodecSettings::builder().alphabet(alphabet).build())
                .unwrap_err();
            assert!(
                matches!(err, CodecError::AlphabetNotUrlSafe(_)),
                "{alphabet:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn unreserved_punctuation_is_accepted() {
        let codec = HashidsCodec::new(
            CodecSettings::builder()
                .salt("s")
                .alphabet("abcdefghijklmnop-._~")
                .build(),
        )
        .unwrap();

        for id in 0..40 {
            let token = codec.encode(id);
            assert!(token.as_str().chars().all(is_url_safe));
            assert_eq!(codec.decode(token.as_str()), Some(id));
        }
    }

    #[test]
    fn debug_output_hides_salt() {
        let codec = codec("super-secret", 4);
        let debug = format!("{codec:?}");
        assert!(!debug.contains("super-secret"));
    }
}
