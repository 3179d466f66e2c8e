//! Tests for alpha reattachment and its fallbacks

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
    use spriteaug::channels::{MergeError, merge_channels, try_merge_channels};
    use spriteaug::io::image::SourceImage;
    use std::io::{self, Write};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    fn rgba_source(width: u32, height: u32) -> SourceImage {
        SourceImage {
            path: PathBuf::from("sprites/group/item/sprite.png"),
            image: DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
                Rgba([1, 2, 3, (x * 10 + y) as u8])
            })),
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs<T>(level: Level, f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(level)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8_lossy(&buffer.0.lock().expect("log buffer")).into_owned();
        (result, text)
    }

    // Tests RGB comes from the variant and alpha from the source
    // Verified by copying alpha from the variant's red channel
    #[test]
    fn test_merge_takes_source_alpha() {
        let source = rgba_source(4, 3);
        let variant = RgbImage::from_pixel(4, 3, Rgb([200, 100, 50]));

        let merged = try_merge_channels(&source.image, &variant).expect("merge");
        assert_eq!(merged.get_pixel(2, 1).0, [200, 100, 50, 21]);
        assert_eq!(merged.get_pixel(0, 0).0, [200, 100, 50, 0]);
    }

    // Tests a size mismatch is reported with both dimensions
    // Verified by comparing only widths
    #[test]
    fn test_merge_dimension_mismatch() {
        let source = rgba_source(4, 3);
        let variant = RgbImage::new(4, 4);

        let err = try_merge_channels(&source.image, &variant);
        assert_eq!(
            err,
            Err(MergeError::DimensionMismatch {
                original: (4, 3),
                augmented: (4, 4),
            })
        );
        let message = MergeError::DimensionMismatch {
            original: (4, 3),
            augmented: (4, 4),
        }
        .to_string();
        assert!(message.contains("4x3") && message.contains("4x4"));
    }

    // Tests sources without alpha are reported as such
    // Verified by synthesising an opaque alpha plane
    #[test]
    fn test_merge_missing_alpha() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert_eq!(
            try_merge_channels(&source, &RgbImage::new(2, 2)),
            Err(MergeError::MissingAlpha)
        );
    }

    // Tests the best-effort wrapper returns RGBA on success and RGB on failure
    // Verified by propagating the mismatch instead of falling back
    #[test]
    fn test_merge_channels_fallback() {
        let source = rgba_source(4, 3);
        let merged = merge_channels(&source, RgbImage::new(4, 3));
        assert!(matches!(merged, DynamicImage::ImageRgba8(_)));

        let mismatched = RgbImage::from_pixel(5, 5, Rgb([9, 9, 9]));
        let kept = merge_channels(&source, mismatched.clone());
        assert_eq!(kept, DynamicImage::ImageRgb8(mismatched));

        let opaque = SourceImage {
            path: PathBuf::from("opaque.jpg"),
            image: DynamicImage::ImageRgb8(RgbImage::new(4, 3)),
        };
        assert!(matches!(
            merge_channels(&opaque, RgbImage::new(4, 3)),
            DynamicImage::ImageRgb8(_)
        ));
    }

    // Tests a size mismatch logs a warning naming the source file
    // Verified by removing the warning from the fallback branch
    #[test]
    fn test_merge_mismatch_logs_source() {
        let source = rgba_source(4, 4);
        let mismatched = RgbImage::new(5, 5);

        let (kept, logs) =
            capture_logs(Level::INFO, || merge_channels(&source, mismatched.clone()));

        assert_eq!(kept, DynamicImage::ImageRgb8(mismatched));
        assert!(logs.contains("WARN"), "no warning in {logs:?}");
        assert!(logs.contains("sprites/group/item/sprite.png"), "file missing in {logs:?}");
        assert!(logs.contains("4x4") && logs.contains("5x5"));
    }

    // Tests a missing alpha plane stays quiet per variant at the default level
    // Verified by logging every alpha-less variant as a warning
    #[test]
    fn test_merge_missing_alpha_is_debug_only() {
        let opaque = SourceImage {
            path: PathBuf::from("opaque.png"),
            image: DynamicImage::ImageRgb8(RgbImage::new(2, 2)),
        };

        let (_, info_logs) =
            capture_logs(Level::INFO, || merge_channels(&opaque, RgbImage::new(2, 2)));
        assert!(!info_logs.contains("opaque.png"));

        let (_, debug_logs) =
            capture_logs(Level::DEBUG, || merge_channels(&opaque, RgbImage::new(2, 2)));
        assert!(debug_logs.contains("opaque.png"));
    }
}
