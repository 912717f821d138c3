use regex::Regex;
use std::sync::LazyLock;

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)([a-z0-9._%+-]+)@((?:[a-z0-9-]+\.)+[a-z]{2,})$")
        .expect("address pattern is valid")
});

/// Whether `input` is a syntactically valid address. Domain labels may not
/// start or end with a hyphen.
pub fn is_valid(input: &str) -> bool {
    let Some(caps) = ADDRESS_RE.captures(input) else {
        return false;
    };
    caps[2]
        .split('.')
        .all(|label| !label.starts_with('-') && !label.ends_with('-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_address() {
        assert!(is_valid("John.Doe+tag@Example.COM"));
    }

    #[test]
    fn test_subdomain() {
        assert!(is_valid("ops@mail.eu.example.org"));
    }

    #[test]
    fn test_rejects_garbage() {
        for input in [
            "not-an-address",
            "",
            "@x.com",
            "a@",
            "a@x",
            "a@x.c",
            "a b@x.com",
            " a@x.com",
            "a@x.com ",
            "a@-x.com",
            "a@x-.com",
            "a@@x.com",
        ] {
            assert!(!is_valid(input), "{input:?} should be rejected");
        }
    }
}
