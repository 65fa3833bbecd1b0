/// Normalizes a URL string for visited-set membership
///
/// # Normalization Steps
///
/// 1. Remove the fragment (everything from the first `#`)
/// 2. Remove trailing slashes (a string made only of slashes becomes `/`)
/// 3. Lowercase the whole string
///
/// The result is idempotent: normalizing an already normalized URL returns
/// it unchanged.
///
/// # Arguments
///
/// * `url` - The URL string to normalize
///
/// # Returns
///
/// The normalized URL string
///
/// # Examples
///
/// ```
/// use ripple_crawler::url::normalize_url;
///
/// assert_eq!(normalize_url("HTTP://Example.com/Page/"), "http://example.com/page");
/// assert_eq!(normalize_url("https://example.com/a#top"), "https://example.com/a");
/// ```
pub fn normalize_url(url: &str) -> String {
    // Step 1: Remove fragment
    let without_fragment = match url.find('#') {
        Some(index) => &url[..index],
        None => url,
    };

    // Step 2: Remove trailing slashes, keeping a lone root slash
    let trimmed = without_fragment.trim_end_matches('/');
    let trimmed = if trimmed.is_empty() && !without_fragment.is_empty() {
        "/"
    } else {
        trimmed
    };

    // Step 3: Lowercase
    trimmed.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page#section"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_remove_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/page/"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_root_trailing_slash() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com");
    }

    #[test]
    fn test_lowercase_everything() {
        assert_eq!(
            normalize_url("HTTPS://EXAMPLE.COM/Some/Path"),
            "https://example.com/some/path"
        );
    }

    #[test]
    fn test_case_and_slash_insensitive() {
        assert_eq!(
            normalize_url("HTTP://Example.com/Page/"),
            normalize_url("http://example.com/page")
        );
    }

    #[test]
    fn test_fragment_before_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/docs/#intro/"),
            "https://example.com/docs"
        );
    }

    #[test]
    fn test_query_preserved() {
        assert_eq!(
            normalize_url("https://example.com/search?Q=Rust"),
            "https://example.com/search?q=rust"
        );
    }

    #[test]
    fn test_only_slashes() {
        assert_eq!(normalize_url("/"), "/");
        assert_eq!(normalize_url("///"), "/");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("#only-fragment"), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "HTTP://Example.com/Page/",
            "https://example.com//",
            "https://example.com/a/b///#frag",
            "https://example.com/?x=1#y",
            "not a url/",
            "/",
            "",
        ];

        for input in inputs {
            let once = normalize_url(input);
            let twice = normalize_url(&once);
            assert_eq!(once, twice, "normalization not idempotent for {:?}", input);
        }
    }
}
