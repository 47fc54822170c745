// src/extract/bucket.rs
// =============================================================================
// BucketFinder: Amazon S3 endpoints referenced from a body.
//
// Recognised forms (case-insensitive):
//   name.s3.amazonaws.com              virtual-hosted
//   name.s3-eu-west-1.amazonaws.com    regional virtual-hosted
//   name.s3-website-us-east-1 / name.s3-website.eu-...   static website
//   //s3.amazonaws.com/name            path-style
//   //s3-eu-west-1.amazonaws.com/name  regional path-style
// =============================================================================

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static BUCKET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)[a-z0-9.-]+\.s3\.amazonaws\.com",
        r"|[a-z0-9.-]+\.s3-[a-z0-9-]+\.amazonaws\.com",
        r"|[a-z0-9.-]+\.s3-website[.-](?:eu|ap|us|ca|sa|cn)",
        r"|//s3\.amazonaws\.com/[a-z0-9._-]+",
        r"|//s3-[a-z0-9-]+\.amazonaws\.com/[a-z0-9._-]+",
    ))
    .unwrap()
});

/// Distinct, URL-decoded bucket references in first-seen order
pub fn find_buckets(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    BUCKET_PATTERN
        .find_iter(body)
        .map(|m| {
            urlencoding::decode(m.as_str())
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| m.as_str().to_string())
        })
        .filter(|bucket| seen.insert(bucket.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_hosted_and_path_style() {
        let body = r#"
            <img src="https://assets-prod.s3.amazonaws.com/logo.png">
            fetch("https://s3.amazonaws.com/backups-2020/db.sql")
        "#;
        assert_eq!(
            find_buckets(body),
            vec!["assets-prod.s3.amazonaws.com", "//s3.amazonaws.com/backups-2020"]
        );
    }

    #[test]
    fn test_regional_forms() {
        let body = "media.s3-eu-west-1.amazonaws.com //s3-us-west-2.amazonaws.com/logs site.s3-website-us-east-1";
        assert_eq!(
            find_buckets(body),
            vec![
                "media.s3-eu-west-1.amazonaws.com",
                "//s3-us-west-2.amazonaws.com/logs",
                "site.s3-website-us",
            ]
        );
    }

    #[test]
    fn test_case_insensitive_and_deduplicated() {
        let body = "Files.S3.AmazonAWS.com files.s3.amazonaws.com Files.S3.AmazonAWS.com";
        assert_eq!(
            find_buckets(body),
            vec!["Files.S3.AmazonAWS.com", "files.s3.amazonaws.com"]
        );
    }

    #[test]
    fn test_nothing_to_find() {
        assert!(find_buckets("<html><body>no buckets</body></html>").is_empty());
    }
}
