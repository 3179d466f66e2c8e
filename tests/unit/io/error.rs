//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use spriteaug::AugmentError;
    use spriteaug::io::error::{WithPath, invalid_parameter, operator_error};
    use std::error::Error;
    use std::path::Path;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = AugmentError::FileSystem {
            path: "/tmp/sprites.zip".into(),
            operation: "open archive",
            source: io_error,
        };

        assert!(error.source().is_some());
        let message = error.to_string();
        assert!(message.contains("open archive"));
        assert!(message.contains("/tmp/sprites.zip"));
    }

    // Tests InvalidParameter error contains all fields and has no source
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("p", &1.5, &"probability must be in [0.0, 1.0]");

        let message = error.to_string();
        assert!(message.contains("'p'"));
        assert!(message.contains("1.5"));
        assert!(message.contains("probability"));
        assert!(error.source().is_none());
    }

    // Tests operator errors name the operator
    // Verified by dropping the operator name from the message
    #[test]
    fn test_operator_error() {
        let error = operator_error("crop_and_pad", &"input image is empty");
        assert_eq!(
            error.to_string(),
            "Operator 'crop_and_pad' failed: input image is empty"
        );
    }

    // Tests path context is attached to raw I/O failures
    // Verified by substituting the unknown placeholder path
    #[test]
    fn test_with_path() {
        let raw: std::io::Result<()> = Err(std::io::Error::other("denied"));
        match raw.with_path(Path::new("out/item"), "create item directory") {
            Err(AugmentError::FileSystem {
                path, operation, ..
            }) => {
                assert_eq!(path, Path::new("out/item"));
                assert_eq!(operation, "create item directory");
            }
            other => panic!("expected file system error, got {other:?}"),
        }
    }

    // Tests the bare io conversion uses placeholder context
    // Verified by removing the From implementation
    #[test]
    fn test_from_io_error() {
        let error: AugmentError = std::io::Error::other("boom").into();
        assert!(matches!(error, AugmentError::FileSystem { operation: "unknown", .. }));
    }
}
