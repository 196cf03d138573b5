//! Shared utilities: the crate-wide error type and logging setup.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests {
    use super::error::RelayError;
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        logging::init("info");
        logging::init("debug");
        logging::init("linkrelay=trace,tower_http=warn");
    }

    #[test]
    fn bind_error_names_the_address() {
        let err = RelayError::Bind {
            addr: "0.0.0.0:4020".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().contains("0.0.0.0:4020"));
    }
}
