//! Dataset preparation module
//!
//! Tools around the degradation step that turn folders of character images
//! into training material and back:
//!
//! # Features
//!
//! - **Split** ([`split`]) - seeded shuffle of a clean corpus into three level folders
//! - **CSV** ([`csv`]) - normalized, flattened rows with an index header
//! - **Binary dump** ([`binary`]) - big-endian `(width, height, count)` header plus raw samples
//!
//! # Example
//!
//! ```rust,no_run
//! use glyph_restore::dataset::{images_to_csv, pack_binary};
//! use std::path::Path;
//!
//! let rows = images_to_csv(Path::new("set_1"), Path::new("set_1.csv"), (48, 48)).unwrap();
//! let packed = pack_binary(Path::new("set_1"), Path::new("train_data")).unwrap();
//! assert_eq!(rows, packed);
//! ```

pub mod binary;
pub mod csv;
pub mod split;
mod types;

// Re-export public API
pub use binary::{binary_image, load_binary, pack_binary, unpack_binary, BinaryDataset};
pub use csv::{csv_row_to_image, images_to_csv, read_csv_row, row_to_image};
pub use split::{split_dataset, split_folder_name, SplitOptions, SplitReport};
pub use types::{
    list_images, DatasetError, Result, BINARY_HEADER_LEN, DEFAULT_IMAGE_SIZE, DEFAULT_PER_FOLDER,
    DEFAULT_SPLIT_SEED, DEFAULT_UNPACK_PREFIX, SPLIT_FOLDERS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_list_images_filters() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("b.JPG"), b"x").unwrap();
        std::fs::write(temp.path().join("a.png"), b"x").unwrap();
        std::fs::write(temp.path().join("c.csv"), b"x").unwrap();

        let files = list_images(temp.path(), &["jpg", "png"]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.JPG"]);
    }

    #[test]
    fn test_list_images_missing_dir() {
        let result = list_images(Path::new("/nonexistent/dir"), &["png"]);
        assert!(matches!(result, Err(DatasetError::InputNotFound(_))));
    }

    #[test]
    fn test_error_types() {
        let _err1 = DatasetError::InputNotFound(PathBuf::from("/test"));
        let _err2 = DatasetError::NoImages(PathBuf::from("/test"));
        let _err3 = DatasetError::IndexOutOfRange { index: 3, count: 1 };
        let err4: DatasetError = std::io::Error::other("test").into();
        assert!(matches!(err4, DatasetError::Io(_)));

        let err = DatasetError::PayloadSize {
            expected: 2304,
            actual: 10,
        };
        assert_eq!(
            err.to_string(),
            "Binary payload is 10 bytes, header declares 2304"
        );

        let err = DatasetError::EmptyDimensions {
            width: 0,
            height: 48,
            count: 7,
        };
        assert_eq!(err.to_string(), "Binary header declares 7 images of 0x48");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_IMAGE_SIZE, 48);
        assert_eq!(SPLIT_FOLDERS, 3);
        assert_eq!(BINARY_HEADER_LEN, 12);
        assert_eq!(SplitOptions::default().per_folder, DEFAULT_PER_FOLDER);
    }
}
