use std::fmt;

#[derive(Debug, Clone)]
pub enum ShortUrlError {
    InvalidTarget(String),
    NotFound(String),
    Import(String),
    Storage(String),
    Broker(String),
    Serialization(String),
    FileOperation(String),
}

impl ShortUrlError {
    /// Stable error code, used by transport adapters for response mapping
    pub fn code(&self) -> &'static str {
        match self {
            ShortUrlError::InvalidTarget(_) => "E001",
            ShortUrlError::NotFound(_) => "E002",
            ShortUrlError::Import(_) => "E003",
            ShortUrlError::Storage(_) => "E004",
            ShortUrlError::Broker(_) => "E005",
            ShortUrlError::Serialization(_) => "E006",
            ShortUrlError::FileOperation(_) => "E007",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ShortUrlError::InvalidTarget(_) => "Invalid Target URL",
            ShortUrlError::NotFound(_) => "Resource Not Found",
            ShortUrlError::Import(_) => "Bulk Import Error",
            ShortUrlError::Storage(_) => "Storage Operation Error",
            ShortUrlError::Broker(_) => "Message Broker Error",
            ShortUrlError::Serialization(_) => "Serialization Error",
            ShortUrlError::FileOperation(_) => "File Operation Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ShortUrlError::InvalidTarget(msg) => msg,
            ShortUrlError::NotFound(msg) => msg,
            ShortUrlError::Import(msg) => msg,
            ShortUrlError::Storage(msg) => msg,
            ShortUrlError::Broker(msg) => msg,
            ShortUrlError::Serialization(msg) => msg,
            ShortUrlError::FileOperation(msg) => msg,
        }
    }

    /// True for client-caused errors that adapters should map to a 4xx response
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ShortUrlError::InvalidTarget(_) | ShortUrlError::NotFound(_) | ShortUrlError::Import(_)
        )
    }
}

impl fmt::Display for ShortUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for ShortUrlError {}

// 便捷的构造函数
impl ShortUrlError {
    pub fn invalid_target<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::InvalidTarget(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::NotFound(msg.into())
    }

    pub fn import<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::Import(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::Storage(msg.into())
    }

    pub fn broker<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::Broker(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ShortUrlError::FileOperation(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for ShortUrlError {
    fn from(err: std::io::Error) -> Self {
        ShortUrlError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShortUrlError {
    fn from(err: serde_json::Error) -> Self {
        ShortUrlError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ShortUrlError {
    fn from(err: csv::Error) -> Self {
        ShortUrlError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortUrlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ShortUrlError::invalid_target("x").code(), "E001");
        assert_eq!(ShortUrlError::not_found("x").code(), "E002");
        assert_eq!(ShortUrlError::import("x").code(), "E003");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ShortUrlError::invalid_target("bad url").is_client_error());
        assert!(ShortUrlError::not_found("abc123").is_client_error());
        assert!(!ShortUrlError::storage("conflict").is_client_error());
        assert!(!ShortUrlError::broker("down").is_client_error());
    }

    #[test]
    fn test_display_format() {
        let err = ShortUrlError::not_found("abc123 is not known");
        assert_eq!(err.to_string(), "Resource Not Found: abc123 is not known");
    }
}
