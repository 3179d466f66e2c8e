//! Tests for loading source sprites and writing numbered variants

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
    use spriteaug::AugmentError;
    use spriteaug::io::image::{SourceImage, load_images, save_images, variant_path};
    use std::fs;
    use std::path::Path;

    // Tests sources load in file name order and hidden files are skipped
    // Verified by returning read_dir order
    #[test]
    fn test_load_images_sorted() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]))
            .save(dir.join("b.png"))
            .expect("Failed to save");
        RgbImage::from_pixel(3, 1, Rgb([5, 6, 7]))
            .save(dir.join("a.png"))
            .expect("Failed to save");
        fs::write(dir.join(".DS_Store"), "junk").expect("Failed to write");
        fs::create_dir(dir.join("nested")).expect("Failed to create dir");

        let images = load_images(dir).expect("Failed to load");
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].name(), "a.png");
        assert!(!images[0].has_alpha());
        assert_eq!(images[1].name(), "b.png");
        assert!(images[1].has_alpha());
    }

    // Tests undecodable files abort loading with the offending path
    // Verified by skipping files that fail to decode
    #[test]
    fn test_load_images_decode_failure() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let bad = temp_dir.path().join("notes.png");
        fs::write(&bad, "not an image").expect("Failed to write");

        match load_images(temp_dir.path()) {
            Err(AugmentError::ImageLoad { path, .. }) => assert_eq!(path, bad),
            other => panic!("expected load error, got {other:?}"),
        }
        assert!(SourceImage::open(&temp_dir.path().join("absent.png")).is_err());
    }

    // Tests an empty folder yields no sources
    // Verified by failing on empty directories
    #[test]
    fn test_load_images_empty() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        assert!(load_images(temp_dir.path()).expect("Failed to load").is_empty());
    }

    // Tests variant names use the folder name and the index
    // Verified by using the source file name as prefix
    #[test]
    fn test_variant_path() {
        assert_eq!(
            variant_path(Path::new("out/sword"), 17),
            Path::new("out/sword/sword_17.png")
        );
    }

    // Tests saving continues from the start index and returns the next free index
    // Verified by restarting numbering at zero
    #[test]
    fn test_save_images_numbering() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("shield");
        fs::create_dir(&dir).expect("Failed to create dir");
        let images = vec![
            DynamicImage::ImageRgb8(RgbImage::new(2, 2)),
            DynamicImage::ImageRgba8(RgbaImage::new(2, 2)),
        ];

        let next = save_images(&images, &dir, 5).expect("Failed to save");
        assert_eq!(next, 7);
        assert!(dir.join("shield_5.png").is_file());
        assert!(dir.join("shield_6.png").is_file());

        let reloaded = image::open(dir.join("shield_6.png")).expect("Failed to open");
        assert!(reloaded.color().has_alpha());
    }

    // Tests writing into a missing folder is an export error
    // Verified by creating missing folders on save
    #[test]
    fn test_save_images_missing_dir() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let images = vec![DynamicImage::ImageRgb8(RgbImage::new(1, 1))];
        let result = save_images(&images, &temp_dir.path().join("missing"), 0);
        assert!(matches!(result, Err(AugmentError::ImageExport { .. })));
    }
}
