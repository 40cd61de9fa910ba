//! URL 验证模块
//!
//! 验证目标 URL，阻止危险协议

use url::Url;

/// URL 验证错误
#[derive(Debug)]
pub enum UrlValidationError {
    EmptyUrl,
    UnsupportedScheme(String),
    DangerousScheme(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::UnsupportedScheme(scheme) => write!(
                f,
                "Unsupported scheme: {}. Only http and https are allowed",
                scheme
            ),
            Self::DangerousScheme(scheme) => {
                write!(f, "Dangerous scheme blocked: {}", scheme)
            }
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 危险协议列表
const DANGEROUS_SCHEMES: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// Validate that a candidate string can be shortened.
///
/// Purely syntactic, no network access:
/// 1. not empty
/// 2. not a dangerous scheme (javascript:, data:, file:, ...)
/// 3. parses as an absolute URL with a host
/// 4. scheme is http or https
pub fn validate_url(candidate: &str) -> Result<(), UrlValidationError> {
    let candidate = candidate.trim();

    if candidate.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let lower = candidate.to_lowercase();
    for scheme in DANGEROUS_SCHEMES {
        if lower.starts_with(scheme) {
            return Err(UrlValidationError::DangerousScheme(scheme.to_string()));
        }
    }

    let parsed =
        Url::parse(candidate).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    if !parsed.has_host() {
        return Err(UrlValidationError::InvalidFormat(
            "URL has no host".to_string(),
        ));
    }

    Ok(())
}

/// True iff the candidate is a well-formed, supported URL
pub fn is_valid_url(candidate: &str) -> bool {
    validate_url(candidate).is_ok()
}
